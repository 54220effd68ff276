// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for DAG run lifecycle events.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// A DAG run was accepted and is about to schedule its start nodes.
///
/// # Log Level
/// `debug!`
pub struct RunStarted {
    pub nodes: usize,
    pub start_nodes: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting DAG run: {} nodes, {} start nodes",
            self.nodes, self.start_nodes
        )
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::debug!(nodes = self.nodes, start_nodes = self.start_nodes, "{}", self);
    }
}

/// A DAG run drained its ready queue.
///
/// # Log Level
/// `debug!`
pub struct RunCompleted {
    pub nodes_run: usize,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "DAG run completed: {} nodes executed", self.nodes_run)
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::debug!(nodes_run = self.nodes_run, "{}", self);
    }
}
