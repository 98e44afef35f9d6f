// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
	#[error("invalid log filter '{filter}': {reason}")]
	InvalidFilter {
		filter: String,
		reason: String,
	},
	#[error("a global tracing subscriber is already installed")]
	AlreadyInstalled,
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
	/// Single-line human-readable output.
	Compact,
	/// Multi-line human-readable output.
	Pretty,
	/// One JSON object per line.
	Json,
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"compact" => Ok(LogFormat::Compact),
			"pretty" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			other => Err(format!("unknown log format '{}'", other)),
		}
	}
}

/// Builder for the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: LevelFilter,
	directives: Vec<String>,
	format: LogFormat,
	use_env: bool,
	with_target: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self {
			level: LevelFilter::INFO,
			directives: Vec::new(),
			format: LogFormat::Compact,
			use_env: true,
			with_target: true,
		}
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Default level for every target.
	pub fn level(mut self, level: LevelFilter) -> Self {
		self.level = level;
		self
	}

	/// Extra filter directive, e.g. `sqlx=warn` or `livewire_cdc=debug`.
	pub fn directive(mut self, directive: impl Into<String>) -> Self {
		self.directives.push(directive.into());
		self
	}

	pub fn format(mut self, format: LogFormat) -> Self {
		self.format = format;
		self
	}

	/// Whether `RUST_LOG` overrides the configured filter. Default: true
	pub fn use_env(mut self, use_env: bool) -> Self {
		self.use_env = use_env;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	/// Filter string built from the configured level and directives.
	pub fn filter_string(&self) -> String {
		std::iter::once(self.level.to_string().to_lowercase())
			.chain(self.directives.iter().cloned())
			.collect::<Vec<_>>()
			.join(",")
	}

	/// Build the env filter, preferring `RUST_LOG` when allowed and set.
	pub fn env_filter(&self) -> Result<EnvFilter, TracingError> {
		if self.use_env {
			if let Ok(filter) = EnvFilter::try_from_default_env() {
				return Ok(filter);
			}
		}

		let filter = self.filter_string();
		EnvFilter::try_new(&filter).map_err(|e| TracingError::InvalidFilter {
			filter,
			reason: e.to_string(),
		})
	}

	/// Install the subscriber globally. Fails if one is already installed.
	pub fn init(self) -> Result<(), TracingError> {
		let filter = self.env_filter()?;
		let registry = tracing_subscriber::registry().with(filter);

		let installed = match self.format {
			LogFormat::Compact => registry.with(fmt::layer().compact().with_target(self.with_target)).try_init(),
			LogFormat::Pretty => registry.with(fmt::layer().pretty().with_target(self.with_target)).try_init(),
			LogFormat::Json => registry.with(fmt::layer().json().with_target(self.with_target)).try_init(),
		};
		installed.map_err(|_| TracingError::AlreadyInstalled)
	}
}
