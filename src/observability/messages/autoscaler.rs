// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for autoscaler decisions and anomalies.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::observability::messages::StructuredLog;

/// The autoscaler control loop started.
///
/// # Log Level
/// `info!`
pub struct AutoscalerStarted {
    pub stages: usize,
    pub interval: Duration,
}

impl Display for AutoscalerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Autoscaler started: {} stages, tick interval {:?}",
            self.stages, self.interval
        )
    }
}

impl StructuredLog for AutoscalerStarted {
    fn log(&self) {
        tracing::info!(
            stages = self.stages,
            interval_ms = self.interval.as_millis() as u64,
            "{}", self
        );
    }
}

/// The autoscaler control loop observed its shutdown signal and exited.
///
/// # Log Level
/// `info!`
pub struct AutoscalerStopped;

impl Display for AutoscalerStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Autoscaler stopped")
    }
}

impl StructuredLog for AutoscalerStopped {
    fn log(&self) {
        tracing::info!("{}", self);
    }
}

/// A stage's worker count was changed by one tick of the control loop.
///
/// # Log Level
/// `info!`
pub struct StageScaled {
    pub stage: usize,
    pub direction: &'static str,
    pub workers: usize,
    pub depth: usize,
}

impl Display for StageScaled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {} scaled {} to {} workers (queue depth {})",
            self.stage, self.direction, self.workers, self.depth
        )
    }
}

impl StructuredLog for StageScaled {
    fn log(&self) {
        tracing::info!(
            stage = self.stage,
            direction = self.direction,
            workers = self.workers,
            depth = self.depth,
            "{}", self
        );
    }
}

/// Both rules fired for the same stage in one tick. The tick takes no
/// action for that stage; the contradiction is counted, not raised.
///
/// # Log Level
/// `warn!`
pub struct ContradictorySignal {
    pub stage: usize,
    pub depth: usize,
}

impl Display for ContradictorySignal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage {}: scale-up and scale-down both signaled (queue depth {}), skipping",
            self.stage, self.depth
        )
    }
}

impl StructuredLog for ContradictorySignal {
    fn log(&self) {
        tracing::warn!(stage = self.stage, depth = self.depth, "{}", self);
    }
}

/// A rule returned the wrong number of booleans; the whole tick is skipped.
///
/// # Log Level
/// `warn!`
pub struct RuleShapeMismatch {
    pub rule: &'static str,
    pub expected: usize,
    pub actual: usize,
}

impl Display for RuleShapeMismatch {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} rule returned {} signals for {} stages, skipping tick",
            self.rule, self.actual, self.expected
        )
    }
}

impl StructuredLog for RuleShapeMismatch {
    fn log(&self) {
        tracing::warn!(rule = self.rule, expected = self.expected, actual = self.actual, "{}", self);
    }
}
