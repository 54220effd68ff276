// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Closure adapter for the [`Component`] contract.

use std::sync::Arc;

use crate::payload::Payload;
use crate::traits::Component;

/// Wraps a plain function or closure as a component. Clones share the
/// underlying function, so replication across workers is an `Arc` bump.
pub struct FnComponent {
    name: String,
    func: Arc<dyn Fn(Payload) -> Payload + Send + Sync>,
}

impl FnComponent {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(Payload) -> Payload + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }
}

impl Component for FnComponent {
    fn invoke(&self, payload: Payload) -> Payload {
        (self.func)(payload)
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invokes_the_closure() {
        let component = FnComponent::new("negate", |payload| {
            let x = payload.positional()[0].as_i64().unwrap();
            Payload::positional_only(vec![json!(-x)])
        });
        let result = component.invoke(Payload::positional_only(vec![json!(3)]));
        assert_eq!(result.positional()[0], json!(-3));
        assert_eq!(component.name(), "negate");
    }

    #[test]
    fn test_clone_box_shares_behavior() {
        let component = FnComponent::new("double", |payload| {
            let x = payload.positional()[0].as_i64().unwrap();
            Payload::positional_only(vec![json!(x * 2)])
        });
        let clone = component.clone_box();
        let result = clone.invoke(Payload::positional_only(vec![json!(4)]));
        assert_eq!(result.positional()[0], json!(8));
        assert_eq!(clone.name(), "double");
    }
}
