// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::io;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Warning {
		description: String,
	},
	Degraded {
		description: String,
	},
	Failed {
		description: String,
	},
	Unknown,
}

impl HealthStatus {
	pub fn is_healthy(&self) -> bool {
		matches!(self, HealthStatus::Healthy)
	}
}

#[derive(Debug, Error)]
pub enum SubsystemError {
	#[error("failed to bind {addr}: {source}")]
	Bind {
		addr: String,
		#[source]
		source: io::Error,
	},
	#[error("{subsystem} failed to start: {reason}")]
	Start {
		subsystem: &'static str,
		reason: String,
	},
}

pub type Result<T> = std::result::Result<T, SubsystemError>;

/// A long-running component with an explicit start/stop lifecycle.
///
/// `start` must be idempotent: calling it on a running subsystem succeeds
/// without side effects.
#[async_trait]
pub trait Subsystem: Send + Sync {
	fn name(&self) -> &'static str;

	async fn start(&mut self) -> Result<()>;

	async fn shutdown(&mut self) -> Result<()>;

	fn is_running(&self) -> bool;

	fn health_status(&self) -> HealthStatus;
}

/// Ordered set of subsystems.
///
/// Started in registration order, shut down in reverse.
#[derive(Default)]
pub struct Subsystems {
	subsystems: Vec<Box<dyn Subsystem>>,
}

impl Subsystems {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, subsystem: Box<dyn Subsystem>) {
		self.subsystems.push(subsystem);
	}

	pub fn with(mut self, subsystem: Box<dyn Subsystem>) -> Self {
		self.add(subsystem);
		self
	}

	pub async fn start_all(&mut self) -> Result<()> {
		for subsystem in self.subsystems.iter_mut() {
			info!("Starting subsystem {}", subsystem.name());
			subsystem.start().await?;
		}
		Ok(())
	}

	/// Shut everything down, continuing past individual failures.
	pub async fn shutdown_all(&mut self) {
		for subsystem in self.subsystems.iter_mut().rev() {
			info!("Stopping subsystem {}", subsystem.name());
			if let Err(e) = subsystem.shutdown().await {
				warn!("Subsystem {} failed to shut down cleanly: {}", subsystem.name(), e);
			}
		}
	}

	pub fn health(&self) -> Vec<(&'static str, HealthStatus)> {
		self.subsystems.iter().map(|s| (s.name(), s.health_status())).collect()
	}

	pub fn len(&self) -> usize {
		self.subsystems.len()
	}

	pub fn is_empty(&self) -> bool {
		self.subsystems.is_empty()
	}
}
