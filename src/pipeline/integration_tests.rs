// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cross-subsystem scenarios: the same component chain run as a staged
//! pipeline, a sequential pipeline, and a DAG must agree.

use std::collections::HashMap;

use serde_json::json;

use crate::components::{CachedComponent, FnComponent};
use crate::dag::{Adjacency, DagEngine};
use crate::payload::Payload;
use crate::pipeline::{PipelineOptions, SequentialPipeline, StagedPipeline};
use crate::pool::{PoolOptions, WorkerPool};
use crate::traits::Component;

fn double() -> Box<dyn Component> {
    Box::new(FnComponent::new("double", |payload: Payload| {
        let x = payload.positional()[0].as_i64().unwrap();
        Payload::positional_only(vec![json!(x * 2)])
    }))
}

fn add_three() -> Box<dyn Component> {
    Box::new(FnComponent::new("add_three", |payload: Payload| {
        let x = payload.positional()[0].as_i64().unwrap();
        Payload::positional_only(vec![json!(x + 3)])
    }))
}

fn int_payload(x: i64) -> Payload {
    Payload::positional_only(vec![json!(x)])
}

fn chain_adjacency() -> Adjacency {
    // 0 -> 1
    Adjacency::new(vec![vec![false, true], vec![false, false]]).unwrap()
}

fn run_staged(input: i64) -> i64 {
    let mut pipeline = StagedPipeline::new(
        vec![
            WorkerPool::new(double(), PoolOptions::default()),
            WorkerPool::new(add_three(), PoolOptions::default()),
        ],
        PipelineOptions::default(),
    )
    .unwrap();
    pipeline.put(int_payload(input)).unwrap();
    let result = pipeline.get().unwrap().positional()[0].as_i64().unwrap();
    pipeline.close();
    result
}

fn run_dag(input: i64) -> i64 {
    let engine = DagEngine::new(vec![double(), add_three()], chain_adjacency()).unwrap();
    let mut inputs = HashMap::new();
    inputs.insert(0, int_payload(input));
    let results = engine.run(inputs).unwrap();
    results[&1].positional()[0].as_i64().unwrap()
}

fn run_sequential(input: i64) -> i64 {
    let pipeline = SequentialPipeline::new(vec![double(), add_three()]);
    pipeline.run(int_payload(input)).positional()[0]
        .as_i64()
        .unwrap()
}

#[test]
fn test_double_then_add_three_yields_13_from_5() {
    assert_eq!(run_staged(5), 13);
}

#[test]
fn test_double_then_add_three_yields_3_from_0() {
    assert_eq!(run_staged(0), 3);
}

#[test]
fn test_chain_dag_matches_staged_pipeline() {
    for input in [0, 5, -7, 100] {
        let staged = run_staged(input);
        assert_eq!(staged, run_dag(input));
        assert_eq!(staged, run_sequential(input));
    }
}

#[test]
fn test_cached_component_works_inside_a_pool() {
    let cached = CachedComponent::new(double(), 0);
    let mut pool = WorkerPool::new(
        cached.clone_box(),
        PoolOptions {
            worker_count: 2,
            ..PoolOptions::default()
        },
    );

    for _ in 0..4 {
        pool.put(int_payload(21)).unwrap();
    }
    for _ in 0..4 {
        assert_eq!(pool.get().unwrap().positional()[0], json!(42));
    }
    pool.close(false);

    // the workers' clones fed the shared cache: four identical payloads,
    // at most one miss per concurrently racing worker
    assert_eq!(cached.hits() + cached.misses(), 4);
    assert!(cached.misses() <= 2);
    assert!(cached.hits() >= 2);
}

#[test]
fn test_single_worker_preserves_fifo_order() {
    // One worker: results come back in submission order.
    let mut pool = WorkerPool::new(double(), PoolOptions::default());
    for x in 0..10 {
        pool.put(int_payload(x)).unwrap();
    }
    for x in 0..10 {
        assert_eq!(pool.get().unwrap().positional()[0], json!(x * 2));
    }
    pool.close(false);
}
