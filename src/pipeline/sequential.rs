// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process sequential pipeline: a plain fold over components.
//!
//! No workers, no queues. Consumes and produces the same [`Payload`]
//! contract as the staged pipeline, so a sequential segment can stand in
//! for a staged one when concurrency is not worth the threads.

use crate::payload::Payload;
use crate::traits::Component;

#[derive(Default)]
pub struct SequentialPipeline {
    components: Vec<Box<dyn Component>>,
}

impl SequentialPipeline {
    pub fn new(components: Vec<Box<dyn Component>>) -> Self {
        Self { components }
    }

    pub fn push(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Apply every component in order. An empty pipeline is the identity.
    pub fn run(&self, payload: Payload) -> Payload {
        self.components
            .iter()
            .fold(payload, |data, component| component.invoke(data))
    }
}
