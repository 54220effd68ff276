// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single-process DAG scheduler with dependency counting and fan-in merge.
//!
//! The engine binds one [`Component`] to each node of a validated
//! [`Adjacency`] relation and executes nodes in data-readiness order: a node
//! runs once every parent has delivered its output. Scheduling uses an
//! in-degree counter per node and a FIFO ready queue, the same dependency
//! counting shape as the concurrent pipeline, but executed on the calling
//! thread so a run is deterministic for a fixed graph.
//!
//! # Fan-in
//!
//! A node with several parents accumulates its input as parents complete:
//! positional values are appended in arrival order, named values are folded
//! through a merge function. The default merge is last-writer-wins per key,
//! which makes the merged result depend on arrival order; callers that need
//! an order-independent result supply a commutative merge via
//! [`DagEngine::run_with_merge`].

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::Value;

use crate::dag::Adjacency;
use crate::errors::{DagInputError, TopologyError};
use crate::observability::messages::engine::{RunCompleted, RunStarted};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use crate::traits::Component;

/// Merge policy for the named values of a fan-in node. Receives the
/// accumulator so far and the newly arrived values, returns the new
/// accumulator.
pub type NamedMerge =
    dyn Fn(HashMap<String, Value>, HashMap<String, Value>) -> HashMap<String, Value>;

/// Default merge: later arrivals overwrite earlier ones on key collision.
pub fn overwrite_merge(
    mut base: HashMap<String, Value>,
    incoming: HashMap<String, Value>,
) -> HashMap<String, Value> {
    base.extend(incoming);
    base
}

/// Executes components as nodes of an acyclic dependency graph.
pub struct DagEngine {
    components: Vec<Box<dyn Component>>,
    adjacency: Adjacency,
}

impl DagEngine {
    /// Bind one component per node. The component list length must match the
    /// adjacency node count.
    pub fn new(
        components: Vec<Box<dyn Component>>,
        adjacency: Adjacency,
    ) -> Result<Self, TopologyError> {
        if components.len() != adjacency.node_count() {
            return Err(TopologyError::ComponentCountMismatch {
                components: components.len(),
                nodes: adjacency.node_count(),
            });
        }
        Ok(Self {
            components,
            adjacency,
        })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.node_count()
    }

    /// Nodes with no incoming edge; `run` requires exactly these as inputs.
    pub fn start_nodes(&self) -> Vec<usize> {
        self.adjacency.start_nodes()
    }

    /// Nodes with no outgoing edge; `run` returns exactly their results.
    pub fn terminal_nodes(&self) -> Vec<usize> {
        self.adjacency.terminal_nodes()
    }

    /// Run the graph with the default overwrite merge.
    pub fn run(
        &self,
        inputs: HashMap<usize, Payload>,
    ) -> Result<HashMap<usize, Payload>, DagInputError> {
        self.run_with_merge(inputs, &overwrite_merge)
    }

    /// Run the graph with a caller-supplied merge for fan-in named values.
    ///
    /// `inputs` must be keyed by exactly the start-node set: an input for a
    /// non-start node or a missing/extra start input fails the call before
    /// any component runs.
    pub fn run_with_merge(
        &self,
        inputs: HashMap<usize, Payload>,
        merge: &NamedMerge,
    ) -> Result<HashMap<usize, Payload>, DagInputError> {
        let start_nodes = self.adjacency.start_nodes();
        let start_set: HashSet<usize> = start_nodes.iter().copied().collect();
        for &node in inputs.keys() {
            if !start_set.contains(&node) {
                return Err(DagInputError::NotAStartNode { node });
            }
        }
        if inputs.len() != start_nodes.len() {
            return Err(DagInputError::StartSetMismatch {
                expected: start_nodes.len(),
                provided: inputs.len(),
            });
        }

        RunStarted {
            nodes: self.node_count(),
            start_nodes: start_nodes.len(),
        }
        .log();

        let mut in_degree: Vec<usize> = (0..self.node_count())
            .map(|node| self.adjacency.parents(node).count())
            .collect();
        let mut pending: HashMap<usize, Payload> = inputs;
        // Start nodes are ready by definition; the queue stays FIFO so
        // single-threaded runs are reproducible.
        let mut ready: VecDeque<usize> = start_nodes.iter().copied().collect();
        let mut results: HashMap<usize, Payload> = HashMap::new();

        while let Some(node) = ready.pop_front() {
            let input = pending.remove(&node).unwrap_or_else(Payload::empty);
            let output = self.components[node].invoke(input);

            for child in self.adjacency.children(node) {
                let accumulator = pending.remove(&child).unwrap_or_else(Payload::empty);
                let (mut positional, named) = accumulator.into_parts();
                positional.extend(output.positional().iter().cloned());
                let named = merge(named, output.named().clone());
                pending.insert(child, Payload::new(positional, named));

                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    ready.push_back(child);
                }
            }
            results.insert(node, output);
        }

        RunCompleted {
            nodes_run: results.len(),
        }
        .log();

        let terminal: HashSet<usize> = self.adjacency.terminal_nodes().into_iter().collect();
        Ok(results
            .into_iter()
            .filter(|(node, _)| terminal.contains(node))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Adjacency;
    use serde_json::json;

    struct AddTwo;

    impl Component for AddTwo {
        fn invoke(&self, payload: Payload) -> Payload {
            let x = payload.positional()[0].as_i64().unwrap();
            Payload::positional_only(vec![json!(x + 2)])
        }

        fn clone_box(&self) -> Box<dyn Component> {
            Box::new(AddTwo)
        }

        fn name(&self) -> &str {
            "add_two"
        }
    }

    struct MultiplyPair;

    impl Component for MultiplyPair {
        fn invoke(&self, payload: Payload) -> Payload {
            let x = payload.positional()[0].as_i64().unwrap();
            let y = payload.positional()[1].as_i64().unwrap();
            Payload::positional_only(vec![json!(x * y)])
        }

        fn clone_box(&self) -> Box<dyn Component> {
            Box::new(MultiplyPair)
        }

        fn name(&self) -> &str {
            "multiply_pair"
        }
    }

    /// Adds 2 to the named value `x`, emitting only `x`.
    struct NamedAddTwo;

    impl Component for NamedAddTwo {
        fn invoke(&self, payload: Payload) -> Payload {
            let x = payload.get("x").and_then(Value::as_i64).unwrap_or(0);
            let mut named = HashMap::new();
            named.insert("x".to_string(), json!(x + 2));
            Payload::named_only(named)
        }

        fn clone_box(&self) -> Box<dyn Component> {
            Box::new(NamedAddTwo)
        }

        fn name(&self) -> &str {
            "named_add_two"
        }
    }

    fn adj(rows: &[&[u8]]) -> Adjacency {
        Adjacency::new(
            rows.iter()
                .map(|row| row.iter().map(|&e| e != 0).collect())
                .collect(),
        )
        .unwrap()
    }

    fn one_input(node: usize, value: i64) -> HashMap<usize, Payload> {
        let mut inputs = HashMap::new();
        inputs.insert(node, Payload::positional_only(vec![json!(value)]));
        inputs
    }

    #[test]
    fn test_component_count_mismatch() {
        let result = DagEngine::new(vec![Box::new(AddTwo)], adj(&[&[0, 1], &[0, 0]]));
        assert!(matches!(
            result,
            Err(TopologyError::ComponentCountMismatch { components: 1, nodes: 2 })
        ));
    }

    #[test]
    fn test_single_node_run() {
        let engine = DagEngine::new(vec![Box::new(AddTwo)], adj(&[&[0]])).unwrap();
        let results = engine.run(one_input(0, 10)).unwrap();
        assert_eq!(results[&0].positional()[0], json!(12));
    }

    #[test]
    fn test_chain_returns_terminal_only() {
        let engine = DagEngine::new(
            vec![Box::new(AddTwo), Box::new(AddTwo)],
            adj(&[&[0, 1], &[0, 0]]),
        )
        .unwrap();
        let results = engine.run(one_input(0, 10)).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[&1].positional()[0], json!(14));
    }

    #[test]
    fn test_rejects_input_for_non_start_node() {
        let engine = DagEngine::new(
            vec![Box::new(AddTwo), Box::new(AddTwo), Box::new(AddTwo)],
            adj(&[&[0, 1, 0], &[0, 0, 0], &[0, 0, 0]]),
        )
        .unwrap();
        let mut inputs = one_input(0, 1);
        inputs.insert(1, Payload::positional_only(vec![json!(1)]));
        assert!(matches!(
            engine.run(inputs),
            Err(DagInputError::NotAStartNode { node: 1 })
        ));
    }

    #[test]
    fn test_rejects_incomplete_start_set() {
        let engine = DagEngine::new(
            vec![Box::new(AddTwo), Box::new(AddTwo)],
            adj(&[&[0, 0], &[0, 0]]),
        )
        .unwrap();
        assert!(matches!(
            engine.run(one_input(0, 1)),
            Err(DagInputError::StartSetMismatch { expected: 2, provided: 1 })
        ));
    }

    #[test]
    fn test_rejects_extra_inputs() {
        let engine = DagEngine::new(vec![Box::new(AddTwo)], adj(&[&[0]])).unwrap();
        let mut inputs = one_input(0, 1);
        inputs.insert(1, Payload::positional_only(vec![json!(2)]));
        assert!(engine.run(inputs).is_err());
    }

    #[test]
    fn test_branching_broadcasts_output() {
        // 0 -> {1, 2}
        let engine = DagEngine::new(
            vec![Box::new(AddTwo), Box::new(AddTwo), Box::new(AddTwo)],
            adj(&[&[0, 1, 1], &[0, 0, 0], &[0, 0, 0]]),
        )
        .unwrap();
        let results = engine.run(one_input(0, 1)).unwrap();
        assert_eq!(results[&1].positional()[0], json!(5));
        assert_eq!(results[&2].positional()[0], json!(5));
    }

    #[test]
    fn test_fan_in_concatenates_positional_values() {
        // {0, 1} -> 2, inputs 10 and 20: (10+2) * (20+2) = 264
        let engine = DagEngine::new(
            vec![Box::new(AddTwo), Box::new(AddTwo), Box::new(MultiplyPair)],
            adj(&[&[0, 0, 1], &[0, 0, 1], &[0, 0, 0]]),
        )
        .unwrap();
        let mut inputs = one_input(0, 10);
        inputs.insert(1, Payload::positional_only(vec![json!(20)]));
        let results = engine.run(inputs).unwrap();
        assert_eq!(results[&2].positional()[0], json!(264));
    }

    #[test]
    fn test_fan_in_waits_for_longer_path() {
        // 0 -> 1 -> 3, 2 -> 3: node 3 must see both parents' outputs.
        let engine = DagEngine::new(
            vec![
                Box::new(AddTwo),
                Box::new(AddTwo),
                Box::new(AddTwo),
                Box::new(MultiplyPair),
            ],
            adj(&[&[0, 1, 0, 0], &[0, 0, 0, 1], &[0, 0, 0, 1], &[0, 0, 0, 0]]),
        )
        .unwrap();
        let mut inputs = one_input(0, 1);
        inputs.insert(2, Payload::positional_only(vec![json!(1)]));
        let results = engine.run(inputs).unwrap();
        // (1+2+2) * (1+2), in either arrival order
        assert_eq!(results[&3].positional()[0], json!(15));
    }

    #[test]
    fn test_default_merge_is_last_writer_wins() {
        // Start nodes 0 and 1 both feed 2; FIFO scheduling fixes arrival
        // order, so node 1's value lands last.
        let engine = DagEngine::new(
            vec![Box::new(NamedAddTwo), Box::new(NamedAddTwo), Box::new(NamedAddTwo)],
            adj(&[&[0, 0, 1], &[0, 0, 1], &[0, 0, 0]]),
        )
        .unwrap();
        let mut inputs = HashMap::new();
        let mut named = HashMap::new();
        named.insert("x".to_string(), json!(1));
        inputs.insert(0, Payload::named_only(named));
        let mut named = HashMap::new();
        named.insert("x".to_string(), json!(2));
        inputs.insert(1, Payload::named_only(named));

        let results = engine.run(inputs).unwrap();
        // node 1 produced x = 4; node 2 adds 2
        assert_eq!(results[&2].get("x"), Some(&json!(6)));
    }

    #[test]
    fn test_custom_commutative_merge() {
        let engine = DagEngine::new(
            vec![Box::new(NamedAddTwo), Box::new(NamedAddTwo), Box::new(NamedAddTwo)],
            adj(&[&[0, 0, 1], &[0, 0, 1], &[0, 0, 0]]),
        )
        .unwrap();
        let mut inputs = HashMap::new();
        let mut named = HashMap::new();
        named.insert("x".to_string(), json!(1));
        inputs.insert(0, Payload::named_only(named));
        let mut named = HashMap::new();
        named.insert("x".to_string(), json!(2));
        inputs.insert(1, Payload::named_only(named));

        // Sum values on collision: order-independent.
        let additive = |mut base: HashMap<String, Value>, incoming: HashMap<String, Value>| {
            for (key, value) in incoming {
                let sum = base.get(&key).and_then(Value::as_i64).unwrap_or(0)
                    + value.as_i64().unwrap_or(0);
                base.insert(key, json!(sum));
            }
            base
        };
        let results = engine.run_with_merge(inputs, &additive).unwrap();
        // parents produce 3 and 4, merged additively to 7, node 2 adds 2
        assert_eq!(results[&2].get("x"), Some(&json!(9)));
    }
}
