// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Subsystem API crate providing the lifecycle interface shared by livewire
//! subsystems
//!
//! The feed pipeline and the streaming HTTP server both implement
//! [`Subsystem`]; the server binary drives them through [`Subsystems`].

pub mod subsystem;

pub use subsystem::{HealthStatus, Result, Subsystem, SubsystemError, Subsystems};
