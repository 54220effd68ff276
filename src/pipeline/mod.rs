// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod autoscaler;
mod sequential;
mod staged;

#[cfg(test)]
mod integration_tests;

pub use autoscaler::{AutoscalerOptions, ScaleRule};
pub use sequential::SequentialPipeline;
pub use staged::{PipelineOptions, StagedPipeline};
