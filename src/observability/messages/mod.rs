// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod autoscaler;
pub mod engine;
pub mod pool;

/// Emit a message through `tracing` at its designated level with structured
/// fields attached.
pub trait StructuredLog {
    fn log(&self);
}
