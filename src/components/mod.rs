// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod cached;
mod func;

pub use cached::CachedComponent;
pub use func::FnComponent;
