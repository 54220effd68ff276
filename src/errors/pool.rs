// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by worker pools and staged pipelines.

use thiserror::Error;

/// Synchronous pool and pipeline failures. All variants are recoverable by
/// the caller; none of them poison the pool.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    /// Worker add/remove was asked for zero workers.
    #[error("worker count must be positive, got {requested}")]
    InvalidWorkerCount { requested: usize },

    /// A put/get targeted a queue index the pool does not have.
    #[error("queue index {index} out of range for {queues} queues")]
    QueueIndexOutOfRange { index: usize, queues: usize },

    /// A pipeline operation targeted a stage that does not exist.
    #[error("stage {stage} out of range for {stages} stages")]
    StageIndexOutOfRange { stage: usize, stages: usize },

    /// The queue's channel is disconnected: every handle on the other side
    /// has been dropped, usually because the owning pool or pipeline closed.
    #[error("queue is closed")]
    QueueClosed,

    /// A graceful removal stopped observing worker exits before collecting
    /// all of them. Workers that did exit have been pruned.
    #[error("removal of {requested} workers timed out after {removed} exits")]
    RemovalTimedOut { requested: usize, removed: usize },
}
