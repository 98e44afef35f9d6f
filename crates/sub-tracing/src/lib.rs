// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Process-wide tracing setup.
//!
//! Installs a `tracing-subscriber` registry with an env filter and either
//! human-readable or JSON output. `RUST_LOG`, when set, takes precedence over
//! the configured level.

pub mod builder;

pub use builder::{LogFormat, TracingBuilder, TracingError};
