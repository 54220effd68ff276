// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One worker: an OS thread running a cloned component over shared queues.
//!
//! The worker loop is built around a bounded wait: each receive attempt on
//! an input queue waits at most `job_timeout`, and the shutdown channel is
//! polled non-blockingly after every attempt, hit or miss. Shutdown is
//! therefore cooperative with latency bounded by `job_timeout` per input
//! queue, and never needs to interrupt a component mid-invocation.
//!
//! Just before its thread returns, a worker reports its id on the
//! completion channel. Graceful removal counts these reports to know when
//! the requested number of workers has actually exited. A component that
//! panics unwinds the thread without a report; the pool does not restart it.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::observability::messages::pool::{WorkerStarted, WorkerStopped};
use crate::observability::messages::StructuredLog;
use crate::payload::Payload;
use crate::queue::PipeQueue;
use crate::traits::Component;

/// The cooperative shutdown signal. One token stops exactly one worker.
#[derive(Debug, Clone, Copy)]
pub struct StopToken;

/// Roster entry for one spawned worker thread.
pub(crate) struct Worker {
    pub(crate) id: usize,
    pub(crate) handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(
        id: usize,
        component: Box<dyn Component>,
        in_queues: Vec<PipeQueue>,
        out_queues: Vec<PipeQueue>,
        stop_rx: Receiver<StopToken>,
        done_tx: Sender<usize>,
        job_timeout: Duration,
    ) -> Self {
        let handle = thread::spawn(move || {
            run_worker(
                id, component, in_queues, out_queues, stop_rx, done_tx, job_timeout,
            )
        });
        Self {
            id,
            handle: Some(handle),
        }
    }
}

fn run_worker(
    id: usize,
    component: Box<dyn Component>,
    in_queues: Vec<PipeQueue>,
    out_queues: Vec<PipeQueue>,
    stop_rx: Receiver<StopToken>,
    done_tx: Sender<usize>,
    job_timeout: Duration,
) {
    WorkerStarted {
        worker_id: id,
        component: component.name(),
    }
    .log();

    'running: loop {
        if in_queues.is_empty() {
            // No inputs to wait on; keep the poll cadence so the stop
            // token is still observed.
            thread::sleep(job_timeout);
            if should_stop(&stop_rx) {
                break 'running;
            }
            continue;
        }
        for queue in &in_queues {
            match queue.recv_timeout(job_timeout) {
                Ok(payload) => {
                    let result = component.invoke(payload);
                    publish(&out_queues, result);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // Nothing will arrive here again; keep the poll cadence
                    // instead of spinning on the dead channel.
                    thread::sleep(job_timeout);
                }
            }
            if should_stop(&stop_rx) {
                break 'running;
            }
        }
    }

    WorkerStopped { worker_id: id }.log();
    let _ = done_tx.send(id);
}

fn should_stop(stop_rx: &Receiver<StopToken>) -> bool {
    match stop_rx.try_recv() {
        Ok(StopToken) => true,
        Err(TryRecvError::Empty) => false,
        Err(TryRecvError::Disconnected) => true,
    }
}

fn publish(out_queues: &[PipeQueue], result: Payload) {
    if let Some((last, rest)) = out_queues.split_last() {
        for queue in rest {
            // A closed output queue has no readers left; the payload is
            // dropped for that queue only.
            let _ = queue.send(result.clone());
        }
        let _ = last.send(result);
    }
}
