// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while validating a dependency graph's shape.

use thiserror::Error;

/// Rejections from DAG construction. Fatal to the construction call; the
/// graph is never partially built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// The adjacency matrix has a row whose length differs from the node count.
    #[error("adjacency matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A node lists itself as its own child.
    #[error("adjacency matrix contains a self-loop at node {node}")]
    SelfLoop { node: usize },

    /// The relation contains a cycle, making data-readiness unsatisfiable.
    #[error("adjacency matrix contains a cycle: {}", path.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" -> "))]
    Cycle { path: Vec<usize> },

    /// The component list and the adjacency matrix disagree on node count.
    #[error("{components} components bound to a graph of {nodes} nodes")]
    ComponentCountMismatch { components: usize, nodes: usize },
}
