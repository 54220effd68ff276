// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod adjacency;
mod engine;

pub use adjacency::Adjacency;
pub use engine::{overwrite_merge, DagEngine, NamedMerge};
