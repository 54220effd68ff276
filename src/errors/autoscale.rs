// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised when starting the autoscaler.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutoscaleError {
    /// A per-stage bound list does not have one entry per stage.
    #[error("{which} bounds list has {actual} entries for {expected} stages")]
    BoundsLengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The autoscaler is already running; stop it before starting again.
    #[error("autoscaler is already running")]
    AlreadyRunning,
}
