// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging message types.
//!
//! Operational events are modeled as typed message structs with a `Display`
//! implementation, rather than format strings scattered through the
//! codebase. Each message also implements [`messages::StructuredLog`],
//! which emits the event through `tracing` with its fields attached, so
//! subscribers can filter on worker id, stage index, or queue depth instead
//! of parsing text.
//!
//! Messages are organized by subsystem:
//! * `messages::pool` - worker and pool lifecycle events
//! * `messages::autoscaler` - scaling decisions and rule anomalies
//! * `messages::engine` - DAG run lifecycle events
//!
//! The library only emits events; it never installs a subscriber. Tests and
//! host binaries bring their own `tracing-subscriber` configuration.

pub mod messages;
