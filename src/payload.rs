// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The value bundle passed between components.
//!
//! A [`Payload`] carries an ordered sequence of positional values plus a map
//! of named values. It is immutable once constructed: there are no mutating
//! accessors, and it crosses queue boundaries by ownership transfer, so two
//! workers never observe the same payload concurrently.
//!
//! Payloads also expose a deterministic [content hash](Payload::content_hash)
//! over the positional sequence and the named entries in lexicographic key
//! order. Memoizing wrappers key their caches on it.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable bundle of positional and named values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl Payload {
    /// Build a payload from positional values and named values.
    pub fn new(positional: Vec<Value>, named: HashMap<String, Value>) -> Self {
        Self { positional, named }
    }

    /// A payload carrying only positional values.
    pub fn positional_only(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: HashMap::new(),
        }
    }

    /// A payload carrying only named values.
    pub fn named_only(named: HashMap<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            named,
        }
    }

    /// A payload with no values at all. Fan-in accumulators start from this.
    pub fn empty() -> Self {
        Self {
            positional: Vec::new(),
            named: HashMap::new(),
        }
    }

    /// The positional values, in construction order.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The named values. Insertion order is not meaningful.
    pub fn named(&self) -> &HashMap<String, Value> {
        &self.named
    }

    /// Look up a named value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    /// Consume the payload, yielding its parts.
    pub fn into_parts(self) -> (Vec<Value>, HashMap<String, Value>) {
        (self.positional, self.named)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Deterministic content hash.
    ///
    /// Hashes the canonical JSON encoding of each positional value in order,
    /// then each named entry in lexicographic key order. Two payloads with
    /// equal content hash to the same value regardless of named-map insertion
    /// order.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for value in &self.positional {
            hasher.write(value.to_string().as_bytes());
            hasher.write_u8(0x1e);
        }
        let mut keys: Vec<&String> = self.named.keys().collect();
        keys.sort();
        for key in keys {
            hasher.write(key.as_bytes());
            hasher.write_u8(0x1f);
            hasher.write(self.named[key].to_string().as_bytes());
            hasher.write_u8(0x1e);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_payload() {
        let payload = Payload::empty();
        assert!(payload.is_empty());
        assert!(payload.positional().is_empty());
        assert!(payload.named().is_empty());
    }

    #[test]
    fn test_positional_order_preserved() {
        let payload = Payload::positional_only(vec![json!(1), json!("two"), json!(3.0)]);
        assert_eq!(payload.positional()[0], json!(1));
        assert_eq!(payload.positional()[1], json!("two"));
        assert_eq!(payload.positional()[2], json!(3.0));
    }

    #[test]
    fn test_named_lookup() {
        let mut named = HashMap::new();
        named.insert("x".to_string(), json!(42));
        let payload = Payload::named_only(named);
        assert_eq!(payload.get("x"), Some(&json!(42)));
        assert_eq!(payload.get("y"), None);
    }

    #[test]
    fn test_content_hash_deterministic() {
        let payload = Payload::positional_only(vec![json!(10)]);
        assert_eq!(payload.content_hash(), payload.content_hash());
    }

    #[test]
    fn test_content_hash_ignores_named_insertion_order() {
        let mut first = HashMap::new();
        first.insert("a".to_string(), json!(1));
        first.insert("b".to_string(), json!(2));
        let mut second = HashMap::new();
        second.insert("b".to_string(), json!(2));
        second.insert("a".to_string(), json!(1));
        assert_eq!(
            Payload::named_only(first).content_hash(),
            Payload::named_only(second).content_hash()
        );
    }

    #[test]
    fn test_content_hash_distinguishes_positional_from_named() {
        let positional = Payload::positional_only(vec![json!("v")]);
        let mut named = HashMap::new();
        named.insert("v".to_string(), json!("v"));
        assert_ne!(
            positional.content_hash(),
            Payload::named_only(named).content_hash()
        );
    }

    #[test]
    fn test_content_hash_differs_on_different_values() {
        let a = Payload::positional_only(vec![json!(1)]);
        let b = Payload::positional_only(vec![json!(2)]);
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
