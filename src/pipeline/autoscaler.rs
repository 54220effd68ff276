// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Background control loop that resizes pipeline stages from queue depths.
//!
//! One autoscaler runs per staged pipeline, on its own lightweight thread,
//! independent of worker execution. Each tick it snapshots the depth of
//! every stage-input queue, evaluates the caller's scale-up and scale-down
//! rules against the snapshot, and grows or shrinks each stage by one
//! worker within its configured bounds.
//!
//! # Rule Sandbox
//!
//! A [`ScaleRule`] is a pure function from the per-stage depth snapshot to
//! one boolean per stage. That typed signature is the entire scripting
//! surface: a rule sees only the depths it is handed and can reach neither
//! pipeline internals nor any ambient capability through the interface.
//!
//! # Contradictions
//!
//! A stage for which both rules fire in the same tick is skipped for that
//! tick. The event is counted and logged but is not an error; a rule pair
//! that disagrees persistently shows up as a climbing counter, not a dead
//! pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::observability::messages::autoscaler::{
    AutoscalerStarted, AutoscalerStopped, ContradictorySignal, RuleShapeMismatch, StageScaled,
};
use crate::observability::messages::StructuredLog;
use crate::pool::WorkerPool;
use crate::queue::PipeQueue;

/// A pure scaling rule: per-stage queue depths in, per-stage votes out.
pub struct ScaleRule(Box<dyn Fn(&[usize]) -> Vec<bool> + Send>);

impl ScaleRule {
    pub fn new(rule: impl Fn(&[usize]) -> Vec<bool> + Send + 'static) -> Self {
        Self(Box::new(rule))
    }

    /// Votes for every stage whose input depth exceeds `threshold`.
    pub fn depth_above(threshold: usize) -> Self {
        Self::new(move |depths| depths.iter().map(|&depth| depth > threshold).collect())
    }

    /// Votes for every stage whose input depth is below `threshold`.
    pub fn depth_below(threshold: usize) -> Self {
        Self::new(move |depths| depths.iter().map(|&depth| depth < threshold).collect())
    }

    fn evaluate(&self, depths: &[usize]) -> Vec<bool> {
        (self.0)(depths)
    }
}

/// Per-stage bounds and the polling interval for one autoscaler run.
pub struct AutoscalerOptions {
    pub interval: Duration,
    /// Scale-down never takes a stage below its entry. One per stage.
    pub lower_bounds: Vec<usize>,
    /// Scale-up never takes a stage above its entry; `None` is unbounded.
    /// One per stage.
    pub upper_bounds: Vec<Option<usize>>,
}

impl AutoscalerOptions {
    /// Defaults for `stages` stages: floor of one worker, no ceiling.
    pub fn for_stages(stages: usize, interval: Duration) -> Self {
        Self {
            interval,
            lower_bounds: vec![1; stages],
            upper_bounds: vec![None; stages],
        }
    }
}

/// Handle to a running control loop. Owned by the pipeline.
pub(crate) struct Autoscaler {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Autoscaler {
    /// Spawn the control loop. Bounds are assumed validated by the caller.
    pub(crate) fn start(
        pools: Arc<Mutex<Vec<WorkerPool>>>,
        depth_queues: Vec<PipeQueue>,
        scale_up: ScaleRule,
        scale_down: ScaleRule,
        options: AutoscalerOptions,
        contradictions: Arc<AtomicU64>,
    ) -> Self {
        let (stop_tx, stop_rx) = unbounded();
        let handle = thread::spawn(move || {
            control_loop(
                pools,
                depth_queues,
                scale_up,
                scale_down,
                options,
                stop_rx,
                contradictions,
            )
        });
        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the loop and wait for it to exit. The loop observes the signal
    /// at its next sleep boundary, so stop latency is bounded by the tick
    /// interval.
    pub(crate) fn stop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn control_loop(
    pools: Arc<Mutex<Vec<WorkerPool>>>,
    depth_queues: Vec<PipeQueue>,
    scale_up: ScaleRule,
    scale_down: ScaleRule,
    options: AutoscalerOptions,
    stop_rx: Receiver<()>,
    contradictions: Arc<AtomicU64>,
) {
    AutoscalerStarted {
        stages: depth_queues.len(),
        interval: options.interval,
    }
    .log();

    loop {
        tick(
            &pools,
            &depth_queues,
            &scale_up,
            &scale_down,
            &options,
            &contradictions,
        );
        match stop_rx.recv_timeout(options.interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    AutoscalerStopped.log();
}

fn tick(
    pools: &Mutex<Vec<WorkerPool>>,
    depth_queues: &[PipeQueue],
    scale_up: &ScaleRule,
    scale_down: &ScaleRule,
    options: &AutoscalerOptions,
    contradictions: &AtomicU64,
) {
    let depths: Vec<usize> = depth_queues.iter().map(PipeQueue::depth).collect();
    let up_votes = scale_up.evaluate(&depths);
    let down_votes = scale_down.evaluate(&depths);
    if up_votes.len() != depths.len() {
        RuleShapeMismatch {
            rule: "scale-up",
            expected: depths.len(),
            actual: up_votes.len(),
        }
        .log();
        return;
    }
    if down_votes.len() != depths.len() {
        RuleShapeMismatch {
            rule: "scale-down",
            expected: depths.len(),
            actual: down_votes.len(),
        }
        .log();
        return;
    }

    let mut pools = pools.lock().unwrap_or_else(PoisonError::into_inner);
    for (stage, pool) in pools.iter_mut().enumerate() {
        match (up_votes[stage], down_votes[stage]) {
            (true, true) => {
                contradictions.fetch_add(1, Ordering::Relaxed);
                ContradictorySignal {
                    stage,
                    depth: depths[stage],
                }
                .log();
            }
            (true, false) => {
                let below_cap = options.upper_bounds[stage]
                    .map_or(true, |cap| pool.worker_count() < cap);
                if below_cap && pool.add_workers(1).is_ok() {
                    StageScaled {
                        stage,
                        direction: "up",
                        workers: pool.worker_count(),
                        depth: depths[stage],
                    }
                    .log();
                }
            }
            (false, true) => {
                if pool.worker_count() > options.lower_bounds[stage]
                    && pool.remove_workers(1, false).is_ok()
                {
                    StageScaled {
                        stage,
                        direction: "down",
                        workers: pool.worker_count(),
                        depth: depths[stage],
                    }
                    .log();
                }
            }
            (false, false) => {}
        }
    }
}
