// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised per DAG run. Recoverable: correct the input set and retry.

use thiserror::Error;

/// The start-node input set handed to a run was not exactly the start-node
/// set of the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DagInputError {
    /// An input was keyed to a node that has incoming edges.
    #[error("node {node} was given an input but is not a start node")]
    NotAStartNode { node: usize },

    /// Too few or too many inputs: every start node needs exactly one.
    #[error("graph has {expected} start nodes but {provided} inputs were provided")]
    StartSetMismatch { expected: usize, provided: usize },
}
