// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker and pool lifecycle events.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// A worker thread entered its receive loop.
///
/// # Log Level
/// `debug!`
pub struct WorkerStarted<'a> {
    pub worker_id: usize,
    pub component: &'a str,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker {} started running component '{}'",
            self.worker_id, self.component
        )
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, component = self.component, "{}", self);
    }
}

/// A worker observed a stop token and is exiting its loop.
///
/// # Log Level
/// `debug!`
pub struct WorkerStopped {
    pub worker_id: usize,
}

impl Display for WorkerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} stopped", self.worker_id)
    }
}

impl StructuredLog for WorkerStopped {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, "{}", self);
    }
}

/// A graceful removal stopped observing worker exits before collecting all
/// of them. The usual cause is a worker lost earlier to a panicking
/// component, which never reports an exit.
///
/// # Log Level
/// `warn!`
pub struct RemovalTimedOut {
    pub requested: usize,
    pub removed: usize,
}

impl Display for RemovalTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Timed out removing workers: {} of {} exits observed",
            self.removed, self.requested
        )
    }
}

impl StructuredLog for RemovalTimedOut {
    fn log(&self) {
        tracing::warn!(requested = self.requested, removed = self.removed, "{}", self);
    }
}

/// The pool's component was hot-swapped.
///
/// # Log Level
/// `info!`
pub struct ComponentSwapped<'a> {
    pub component: &'a str,
    pub worker_count: usize,
}

impl Display for ComponentSwapped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Swapped pool component to '{}' with {} workers",
            self.component, self.worker_count
        )
    }
}

impl StructuredLog for ComponentSwapped<'_> {
    fn log(&self) {
        tracing::info!(component = self.component, worker_count = self.worker_count, "{}", self);
    }
}

/// A worker thread was found panicked while pruning the roster.
///
/// # Log Level
/// `warn!`
pub struct WorkerPanicked {
    pub worker_id: usize,
}

impl Display for WorkerPanicked {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} exited by panic", self.worker_id)
    }
}

impl StructuredLog for WorkerPanicked {
    fn log(&self) {
        tracing::warn!(worker_id = self.worker_id, "{}", self);
    }
}
