// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A dynamically resizable pool of workers running one component.
//!
//! The pool owns the worker roster, the input/output queue lists, and the
//! shutdown channel. Each worker runs its own clone of the component, so the
//! pool can grow (`add_workers`), shrink (`remove_workers`), hot-swap the
//! component (`change_component`), and shut down (`close`) without touching
//! payloads in flight anywhere else in the pipeline.
//!
//! # Shutdown
//!
//! Shrinking pushes one [`StopToken`] per departing worker onto the shared
//! shutdown channel; whichever workers poll next consume them and exit. A
//! graceful shrink then waits for that many exit reports, bounded by
//! `MAX_REMOVE_RETRIES` waits of twice the job timeout each, so a removal can
//! outlast an in-flight job but can never hang forever. A forced shrink
//! detaches the departing workers instead of waiting: their threads still
//! exit at the next poll boundary, and anything they publish in the meantime
//! is the documented in-flight loss of a forced stop.
//!
//! # Queue Ownership
//!
//! Queues the pool creates for itself die with the pool: `close` drops the
//! pool's handles and, with no other senders left, the channel disconnects.
//! Externally supplied queues survive `close` because the external owner
//! still holds a handle.

use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::errors::PoolError;
use crate::observability::messages::pool::{ComponentSwapped, RemovalTimedOut, WorkerPanicked};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use crate::pool::worker::Worker;
use crate::pool::StopToken;
use crate::queue::PipeQueue;
use crate::traits::Component;

/// Bounded retries while waiting for one graceful removal's exits.
const MAX_REMOVE_RETRIES: usize = 5;

/// Construction parameters for [`WorkerPool`]. Unset queue lists become one
/// pool-created unbounded queue each.
pub struct PoolOptions {
    pub worker_count: usize,
    /// Upper bound on one receive attempt in the worker loop; also the
    /// worker's shutdown latency per input queue.
    pub job_timeout: Duration,
    pub in_queues: Option<Vec<PipeQueue>>,
    pub out_queues: Option<Vec<PipeQueue>>,
    /// Share a shutdown channel with another pool instead of creating one.
    pub stop_channel: Option<(Sender<StopToken>, Receiver<StopToken>)>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            worker_count: 1,
            job_timeout: Duration::from_millis(100),
            in_queues: None,
            out_queues: None,
            stop_channel: None,
        }
    }
}

/// Parameters for [`WorkerPool::change_component`]. Queue lists left `None`
/// keep the pool's current wiring.
pub struct SwapOptions {
    pub worker_count: usize,
    pub in_queues: Option<Vec<PipeQueue>>,
    pub out_queues: Option<Vec<PipeQueue>>,
    pub force: bool,
}

impl Default for SwapOptions {
    fn default() -> Self {
        Self {
            worker_count: 1,
            in_queues: None,
            out_queues: None,
            force: false,
        }
    }
}

/// A resizable set of workers executing one component over shared queues.
pub struct WorkerPool {
    component: Box<dyn Component>,
    workers: Vec<Worker>,
    in_queues: Vec<PipeQueue>,
    out_queues: Vec<PipeQueue>,
    stop_tx: Sender<StopToken>,
    stop_rx: Receiver<StopToken>,
    done_tx: Sender<usize>,
    done_rx: Receiver<usize>,
    job_timeout: Duration,
    next_worker_id: usize,
    closed: bool,
}

impl WorkerPool {
    pub fn new(component: Box<dyn Component>, options: PoolOptions) -> Self {
        let in_queues = options
            .in_queues
            .unwrap_or_else(|| vec![PipeQueue::unbounded()]);
        let out_queues = options
            .out_queues
            .unwrap_or_else(|| vec![PipeQueue::unbounded()]);
        let (stop_tx, stop_rx) = options.stop_channel.unwrap_or_else(unbounded);
        let (done_tx, done_rx) = unbounded();

        let mut pool = Self {
            component,
            workers: Vec::new(),
            in_queues,
            out_queues,
            stop_tx,
            stop_rx,
            done_tx,
            done_rx,
            job_timeout: options.job_timeout,
            next_worker_id: 0,
            closed: false,
        };
        for _ in 0..options.worker_count {
            pool.spawn_worker();
        }
        pool
    }

    fn spawn_worker(&mut self) {
        let id = self.next_worker_id;
        self.next_worker_id += 1;
        self.workers.push(Worker::spawn(
            id,
            self.component.clone_box(),
            self.in_queues.clone(),
            self.out_queues.clone(),
            self.stop_rx.clone(),
            self.done_tx.clone(),
            self.job_timeout,
        ));
    }

    /// Live worker count.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a payload on the first input queue.
    pub fn put(&self, payload: Payload) -> Result<(), PoolError> {
        self.put_to(0, payload)
    }

    /// Enqueue a payload on the indicated input queue. There is no implicit
    /// load balancing across queues; workers drain whichever queue the
    /// caller targets.
    pub fn put_to(&self, index: usize, payload: Payload) -> Result<(), PoolError> {
        let queue = self
            .in_queues
            .get(index)
            .ok_or(PoolError::QueueIndexOutOfRange {
                index,
                queues: self.in_queues.len(),
            })?;
        queue.send(payload)
    }

    /// Block until a result is available on the first output queue.
    pub fn get(&self) -> Result<Payload, PoolError> {
        self.get_from(0)
    }

    /// Block until a result is available on the indicated output queue.
    pub fn get_from(&self, index: usize) -> Result<Payload, PoolError> {
        let queue = self
            .out_queues
            .get(index)
            .ok_or(PoolError::QueueIndexOutOfRange {
                index,
                queues: self.out_queues.len(),
            })?;
        queue.recv()
    }

    /// Grow the pool by `n` workers sharing the existing queues.
    pub fn add_workers(&mut self, n: usize) -> Result<(), PoolError> {
        if n == 0 {
            return Err(PoolError::InvalidWorkerCount { requested: n });
        }
        for _ in 0..n {
            self.spawn_worker();
        }
        Ok(())
    }

    /// Shrink the pool by `n` workers, clamped to the live count.
    ///
    /// Non-forced removal waits for the departing workers' in-flight jobs to
    /// finish: the call blocks until `n` exit reports arrive, each awaited
    /// with bounded retries, and returns [`PoolError::RemovalTimedOut`] if
    /// exits stop arriving (typically because a worker was lost earlier to a
    /// panicking component). Forced removal returns immediately; the
    /// departing threads exit at their next poll boundary and any result
    /// published between now and then is lost to the caller.
    pub fn remove_workers(&mut self, n: usize, force: bool) -> Result<(), PoolError> {
        if n == 0 {
            return Err(PoolError::InvalidWorkerCount { requested: n });
        }
        let n = n.min(self.workers.len());
        if n == 0 {
            return Ok(());
        }
        for _ in 0..n {
            let _ = self.stop_tx.send(StopToken);
        }

        if force {
            for _ in 0..n {
                if let Some(mut worker) = self.workers.pop() {
                    // Detach: the thread exits on its own once it polls the
                    // shutdown channel.
                    worker.handle.take();
                }
            }
            return Ok(());
        }

        let wait = self.job_timeout * 2;
        let mut removed = 0;
        let mut attempts = 0;
        while removed < n {
            match self.done_rx.recv_timeout(wait) {
                Ok(id) => {
                    // Exit reports from workers detached by an earlier forced
                    // removal are still in the channel; only roster members
                    // count.
                    if self.prune(id) {
                        removed += 1;
                        attempts = 0;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    attempts += 1;
                    if attempts >= MAX_REMOVE_RETRIES {
                        self.sweep_panicked();
                        RemovalTimedOut {
                            requested: n,
                            removed,
                        }
                        .log();
                        return Err(PoolError::RemovalTimedOut {
                            requested: n,
                            removed,
                        });
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(PoolError::RemovalTimedOut {
                        requested: n,
                        removed,
                    });
                }
            }
        }
        Ok(())
    }

    /// Remove the roster entry for `id` and join its finished thread.
    fn prune(&mut self, id: usize) -> bool {
        match self.workers.iter().position(|worker| worker.id == id) {
            Some(index) => {
                let mut worker = self.workers.remove(index);
                if let Some(handle) = worker.handle.take() {
                    let _ = handle.join();
                }
                true
            }
            None => false,
        }
    }

    /// Drop roster entries whose threads are already dead without having
    /// reported an exit; those unwound on a component panic.
    fn sweep_panicked(&mut self) {
        let mut kept = Vec::with_capacity(self.workers.len());
        for mut worker in self.workers.drain(..) {
            let finished = worker
                .handle
                .as_ref()
                .map_or(true, |handle| handle.is_finished());
            if finished {
                if let Some(handle) = worker.handle.take() {
                    if handle.join().is_err() {
                        WorkerPanicked {
                            worker_id: worker.id,
                        }
                        .log();
                    }
                }
            } else {
                kept.push(worker);
            }
        }
        self.workers = kept;
    }

    /// Stop all workers, swap the component, optionally rewire the queues,
    /// and start `options.worker_count` fresh workers.
    ///
    /// Queue lists left `None` are untouched, so a hot swap does not disturb
    /// wiring shared with the rest of a pipeline.
    pub fn change_component(
        &mut self,
        component: Box<dyn Component>,
        options: SwapOptions,
    ) -> Result<(), PoolError> {
        self.reconfigure(
            component,
            options.worker_count,
            options.in_queues,
            options.out_queues,
            options.force,
        )?;
        ComponentSwapped {
            component: self.component.name(),
            worker_count: self.workers.len(),
        }
        .log();
        Ok(())
    }

    /// Re-point this pool at new queues, restarting its workers. Worker
    /// count is preserved.
    pub(crate) fn rewire(
        &mut self,
        in_queues: Vec<PipeQueue>,
        out_queues: Vec<PipeQueue>,
    ) -> Result<(), PoolError> {
        let worker_count = self.workers.len().max(1);
        let component = self.component.clone_box();
        self.reconfigure(
            component,
            worker_count,
            Some(in_queues),
            Some(out_queues),
            false,
        )
    }

    fn reconfigure(
        &mut self,
        component: Box<dyn Component>,
        worker_count: usize,
        in_queues: Option<Vec<PipeQueue>>,
        out_queues: Option<Vec<PipeQueue>>,
        force: bool,
    ) -> Result<(), PoolError> {
        if !self.workers.is_empty() {
            self.remove_workers(self.workers.len(), force)?;
        }
        self.component = component;
        if let Some(queues) = in_queues {
            self.in_queues = queues;
        }
        if let Some(queues) = out_queues {
            self.out_queues = queues;
        }
        for _ in 0..worker_count {
            self.spawn_worker();
        }
        Ok(())
    }

    /// Stop every worker and drop this pool's queue handles. Queues the pool
    /// created disconnect here; externally supplied queues stay open for
    /// their owners. Safe to call repeatedly; never blocks past the bounded
    /// removal wait.
    pub fn close(&mut self, force: bool) {
        if self.closed {
            return;
        }
        if !self.workers.is_empty() {
            let count = self.workers.len();
            if let Err(error) = self.remove_workers(count, force) {
                tracing::warn!(%error, "detaching workers that did not exit during close");
                for mut worker in self.workers.drain(..) {
                    worker.handle.take();
                }
            }
        }
        self.in_queues.clear();
        self.out_queues.clear();
        self.closed = true;
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close(false);
    }
}
