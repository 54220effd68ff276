// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod worker;
mod worker_pool;

pub use worker::StopToken;
pub use worker_pool::{PoolOptions, SwapOptions, WorkerPool};
