// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Memoizing wrapper around any component.
//!
//! Results are keyed by the payload's [content hash](crate::Payload::content_hash)
//! and shared across clones, so every worker in a pool running the same
//! wrapped component reads and feeds one cache. The wrapper exposes the
//! unchanged [`Component`] contract and can therefore wrap, or be wrapped
//! by, anything else that speaks it.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::payload::Payload;
use crate::traits::Component;

struct CacheState {
    map: HashMap<u64, Payload>,
    /// Insertion order, oldest first, for eviction at capacity.
    order: VecDeque<u64>,
}

/// A component wrapper that memoizes results per input payload.
pub struct CachedComponent {
    name: String,
    inner: Box<dyn Component>,
    cache: Arc<Mutex<CacheState>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    capacity: usize,
}

impl CachedComponent {
    /// Wrap `inner`, keeping at most `capacity` results (0 = unlimited).
    /// Eviction drops the oldest inserted entry.
    pub fn new(inner: Box<dyn Component>, capacity: usize) -> Self {
        Self {
            name: format!("cached-{}", inner.name()),
            inner,
            cache: Arc::new(Mutex::new(CacheState {
                map: HashMap::new(),
                order: VecDeque::new(),
            })),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().map.len()
    }

    pub fn cache_clear(&self) {
        let mut cache = self.lock_cache();
        cache.map.clear();
        cache.order.clear();
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Component for CachedComponent {
    fn invoke(&self, payload: Payload) -> Payload {
        let key = payload.content_hash();
        if let Some(result) = self.lock_cache().map.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(component = %self.name, key, "cache hit");
            return result.clone();
        }

        // The lock is not held across the inner invocation; two workers
        // racing on the same key recompute, which is benign.
        let result = self.inner.invoke(payload);
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(component = %self.name, key, "cache miss");

        let mut cache = self.lock_cache();
        if !cache.map.contains_key(&key) {
            if self.capacity > 0 && cache.map.len() >= self.capacity {
                if let Some(oldest) = cache.order.pop_front() {
                    cache.map.remove(&oldest);
                }
            }
            cache.map.insert(key, result.clone());
            cache.order.push_back(key);
        }
        result
    }

    fn clone_box(&self) -> Box<dyn Component> {
        Box::new(Self {
            name: self.name.clone(),
            inner: self.inner.clone_box(),
            cache: Arc::clone(&self.cache),
            hits: Arc::clone(&self.hits),
            misses: Arc::clone(&self.misses),
            capacity: self.capacity,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
