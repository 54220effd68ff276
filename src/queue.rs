// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Queue handles connecting pools, pipelines, and the autoscaler.
//!
//! A [`PipeQueue`] is a cloneable handle onto a multi-producer multi-consumer
//! channel. Clones share the same underlying queue: any holder may send,
//! receive, or sample the current depth. Delivery within one queue is FIFO to
//! whichever consumer receives next.
//!
//! Close responsibility follows ownership of the handles. The channel reports
//! disconnected once every sending handle is dropped, so a pool that created
//! its own queue closes it by dropping its handles on `close()`, while a
//! queue supplied from outside stays open because the external owner still
//! holds one. Nothing here needs an explicit close call.
//!
//! Queues are unbounded by default. A bounded queue makes `send` block while
//! full, which is the backpressure knob for memory-constrained stages.

use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use crate::errors::PoolError;
use crate::payload::Payload;

/// A cloneable handle onto one payload queue.
#[derive(Clone)]
pub struct PipeQueue {
    tx: Sender<Payload>,
    rx: Receiver<Payload>,
}

impl PipeQueue {
    /// A queue with no capacity limit. `send` never blocks.
    pub fn unbounded() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A queue that holds at most `capacity` payloads. `send` blocks while
    /// the queue is full.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    /// Enqueue a payload.
    pub fn send(&self, payload: Payload) -> Result<(), PoolError> {
        self.tx.send(payload).map_err(|_| PoolError::QueueClosed)
    }

    /// Dequeue a payload, blocking until one is available.
    pub fn recv(&self) -> Result<Payload, PoolError> {
        self.rx.recv().map_err(|_| PoolError::QueueClosed)
    }

    /// Dequeue with a bounded wait. Worker loops use this so they can poll
    /// their stop channel between attempts.
    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<Payload, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Number of payloads currently queued.
    pub fn depth(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl std::fmt::Debug for PipeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeQueue")
            .field("depth", &self.depth())
            .finish()
    }
}
