// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adjacency relation for the DAG engine, validated at construction.
//!
//! The relation is an n×n boolean matrix where entry (i, j) means node i's
//! output feeds node j's input. Construction rejects non-square matrices,
//! self-loops, and cycles; once an [`Adjacency`] exists it is known acyclic
//! and is never re-validated.
//!
//! # Cycle Detection
//!
//! Depth-first search with a tri-state mark per node (unvisited, on the DFS
//! stack, done). A back-edge to an on-stack node is a cycle, and the path
//! from that node to the top of the stack is reported in the error. The
//! search is iterative with an explicit stack, so node count is not limited
//! by recursion depth.

use crate::errors::TopologyError;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// A validated acyclic adjacency relation over nodes `0..n`.
#[derive(Debug, Clone)]
pub struct Adjacency {
    edges: Vec<Vec<bool>>,
}

impl Adjacency {
    /// Validate and wrap an adjacency matrix.
    ///
    /// Checks run in order: squareness, self-loops, cycles. The first
    /// violation found is returned.
    pub fn new(edges: Vec<Vec<bool>>) -> Result<Self, TopologyError> {
        let n = edges.len();
        for (row, entries) in edges.iter().enumerate() {
            if entries.len() != n {
                return Err(TopologyError::NotSquare {
                    row,
                    len: entries.len(),
                    expected: n,
                });
            }
        }
        for node in 0..n {
            if edges[node][node] {
                return Err(TopologyError::SelfLoop { node });
            }
        }
        let adjacency = Self { edges };
        adjacency.check_acyclic()?;
        Ok(adjacency)
    }

    fn check_acyclic(&self) -> Result<(), TopologyError> {
        let n = self.edges.len();
        let mut marks = vec![Mark::Unvisited; n];

        for root in 0..n {
            if marks[root] != Mark::Unvisited {
                continue;
            }
            // Each frame is (node, next column to scan for a child edge).
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
            marks[root] = Mark::OnStack;

            while let Some(&(node, cursor)) = stack.last() {
                match (cursor..n).find(|&child| self.edges[node][child]) {
                    Some(child) => {
                        let top = stack.len() - 1;
                        stack[top].1 = child + 1;
                        match marks[child] {
                            Mark::OnStack => {
                                // Back-edge: the cycle runs from `child`'s
                                // position on the stack up to `node`.
                                let start = stack
                                    .iter()
                                    .position(|&(on_stack, _)| on_stack == child)
                                    .unwrap();
                                let mut path: Vec<usize> =
                                    stack[start..].iter().map(|&(v, _)| v).collect();
                                path.push(child);
                                return Err(TopologyError::Cycle { path });
                            }
                            Mark::Unvisited => {
                                marks[child] = Mark::OnStack;
                                stack.push((child, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[node] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of nodes in the relation.
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Children of `node`: every j with an edge (node, j).
    pub fn children(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges[node]
            .iter()
            .enumerate()
            .filter_map(|(j, &edge)| edge.then_some(j))
    }

    /// Parents of `node`: every i with an edge (i, node).
    pub fn parents(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(move |(i, row)| row[node].then_some(i))
    }

    /// Nodes with no incoming edge (zero column sum), ascending.
    pub fn start_nodes(&self) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&node| self.parents(node).next().is_none())
            .collect()
    }

    /// Nodes with no outgoing edge (zero row sum), ascending.
    pub fn terminal_nodes(&self) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&node| self.children(node).next().is_none())
            .collect()
    }
}
