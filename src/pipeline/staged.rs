// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker pools chained in series by shared queues.
//!
//! A staged pipeline wires `n` pools through `n + 1` queues: the boundary
//! input, `n - 1` internal queues, and the boundary output. Queue `k` is
//! simultaneously pool `k-1`'s only output and pool `k`'s only input, so a
//! payload pushed at the boundary flows stage to stage until it lands on
//! the boundary output. Boundary queues may be supplied by the caller;
//! internal queues always belong to the pipeline.
//!
//! Pools sit behind a mutex shared with the autoscaler's control thread,
//! which is the only other party that resizes stages. The data path itself
//! (queues, workers) takes no lock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::{AutoscaleError, PoolError};
use crate::payload::Payload;
use crate::pipeline::autoscaler::{Autoscaler, AutoscalerOptions, ScaleRule};
use crate::pool::WorkerPool;
use crate::queue::PipeQueue;

/// Boundary queues for [`StagedPipeline::new`]. Unset boundaries become
/// pipeline-created unbounded queues.
#[derive(Default)]
pub struct PipelineOptions {
    pub in_queue: Option<PipeQueue>,
    pub out_queue: Option<PipeQueue>,
}

/// An ordered chain of worker pools with one entry and one exit point.
pub struct StagedPipeline {
    pools: Arc<Mutex<Vec<WorkerPool>>>,
    /// `stages + 1` queues; index `k` feeds stage `k`.
    queues: Vec<PipeQueue>,
    autoscaler: Option<Autoscaler>,
    contradictions: Arc<AtomicU64>,
    closed: bool,
}

impl StagedPipeline {
    /// Chain `pools` in order, rewiring each to its slot in the queue chain.
    /// Every pool's workers restart on the new wiring.
    pub fn new(pools: Vec<WorkerPool>, options: PipelineOptions) -> Result<Self, PoolError> {
        let stages = pools.len();
        let mut queues = Vec::with_capacity(stages + 1);
        queues.push(options.in_queue.unwrap_or_else(PipeQueue::unbounded));
        for _ in 0..stages.saturating_sub(1) {
            queues.push(PipeQueue::unbounded());
        }
        if stages > 0 {
            queues.push(options.out_queue.unwrap_or_else(PipeQueue::unbounded));
        }

        let pipeline = Self {
            pools: Arc::new(Mutex::new(pools)),
            queues,
            autoscaler: None,
            contradictions: Arc::new(AtomicU64::new(0)),
            closed: false,
        };
        pipeline.refresh()?;
        Ok(pipeline)
    }

    fn lock_pools(&self) -> MutexGuard<'_, Vec<WorkerPool>> {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stages.
    pub fn stage_count(&self) -> usize {
        self.lock_pools().len()
    }

    /// Live worker count per stage.
    pub fn worker_counts(&self) -> Vec<usize> {
        self.lock_pools()
            .iter()
            .map(WorkerPool::worker_count)
            .collect()
    }

    /// Enqueue a payload on the boundary input queue.
    pub fn put(&self, payload: Payload) -> Result<(), PoolError> {
        self.queues
            .first()
            .ok_or(PoolError::QueueClosed)?
            .send(payload)
    }

    /// Block until a payload lands on the boundary output queue.
    pub fn get(&self) -> Result<Payload, PoolError> {
        self.queues.last().ok_or(PoolError::QueueClosed)?.recv()
    }

    /// Re-apply the current wiring to every pool. Idempotent; used to
    /// re-sync after external mutation of a pool's queues.
    pub fn refresh(&self) -> Result<(), PoolError> {
        let mut pools = self.lock_pools();
        for (stage, pool) in pools.iter_mut().enumerate() {
            pool.rewire(
                vec![self.queues[stage].clone()],
                vec![self.queues[stage + 1].clone()],
            )?;
        }
        Ok(())
    }

    /// Grow the targeted stage by `n` workers.
    pub fn add_workers(&self, stage: usize, n: usize) -> Result<(), PoolError> {
        let mut pools = self.lock_pools();
        let stages = pools.len();
        pools
            .get_mut(stage)
            .ok_or(PoolError::StageIndexOutOfRange { stage, stages })?
            .add_workers(n)
    }

    /// Shrink the targeted stage by `n` workers, gracefully.
    pub fn remove_workers(&self, stage: usize, n: usize) -> Result<(), PoolError> {
        let mut pools = self.lock_pools();
        let stages = pools.len();
        pools
            .get_mut(stage)
            .ok_or(PoolError::StageIndexOutOfRange { stage, stages })?
            .remove_workers(n, false)
    }

    /// Start the background control loop for this pipeline.
    ///
    /// Both bound lists must have one entry per stage. Fails with
    /// [`AutoscaleError::AlreadyRunning`] if the loop is active; call
    /// [`close_autoscaling`](Self::close_autoscaling) first to restart with
    /// different rules.
    pub fn start_autoscaling(
        &mut self,
        scale_up: ScaleRule,
        scale_down: ScaleRule,
        options: AutoscalerOptions,
    ) -> Result<(), AutoscaleError> {
        if self.autoscaler.is_some() {
            return Err(AutoscaleError::AlreadyRunning);
        }
        let stages = self.stage_count();
        if options.lower_bounds.len() != stages {
            return Err(AutoscaleError::BoundsLengthMismatch {
                which: "lower",
                expected: stages,
                actual: options.lower_bounds.len(),
            });
        }
        if options.upper_bounds.len() != stages {
            return Err(AutoscaleError::BoundsLengthMismatch {
                which: "upper",
                expected: stages,
                actual: options.upper_bounds.len(),
            });
        }

        // One depth sample per stage input: every queue except boundary-out.
        let depth_queues = self.queues[..stages].to_vec();
        self.autoscaler = Some(Autoscaler::start(
            Arc::clone(&self.pools),
            depth_queues,
            scale_up,
            scale_down,
            options,
            Arc::clone(&self.contradictions),
        ));
        Ok(())
    }

    /// Stop the control loop if it is running. Blocks until the loop thread
    /// exits, which it does at its next sleep boundary.
    pub fn close_autoscaling(&mut self) {
        if let Some(mut autoscaler) = self.autoscaler.take() {
            autoscaler.stop();
        }
    }

    /// Whether the control loop is currently running.
    pub fn autoscaling(&self) -> bool {
        self.autoscaler.is_some()
    }

    /// Cumulative count of contradictory-signal ticks across all autoscaler
    /// runs of this pipeline.
    pub fn contradiction_count(&self) -> u64 {
        self.contradictions.load(Ordering::Relaxed)
    }

    /// Stop the autoscaler, close every pool (each drains its own workers),
    /// and drop the pipeline's queue handles. Idempotent; bounded waits
    /// only.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.close_autoscaling();
        {
            let mut pools = self.lock_pools();
            for pool in pools.iter_mut() {
                pool.close(false);
            }
        }
        self.queues.clear();
        self.closed = true;
    }
}

impl Drop for StagedPipeline {
    fn drop(&mut self) {
        self.close();
    }
}
