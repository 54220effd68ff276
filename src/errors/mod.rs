// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod autoscale;
mod dag;
mod pool;
mod topology;

pub use autoscale::AutoscaleError;
pub use dag::DagInputError;
pub use pool::PoolError;
pub use topology::TopologyError;
