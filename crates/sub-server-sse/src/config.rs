// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Configuration for the streaming HTTP server.
#[derive(Debug, Clone)]
pub struct SseConfig {
	/// Address and port to bind to.
	///
	/// Default: 0.0.0.0:4000
	pub bind_addr: String,

	/// Origin allowed to read the stream cross-origin. `*` allows any.
	///
	/// Default: `*`
	pub front_origin: String,

	/// How long shutdown waits for the server to drain after every stream has
	/// been closed.
	///
	/// Default: 5 seconds
	pub shutdown_timeout: Duration,
}

impl Default for SseConfig {
	fn default() -> Self {
		Self {
			bind_addr: "0.0.0.0:4000".to_string(),
			front_origin: "*".to_string(),
			shutdown_timeout: Duration::from_secs(5),
		}
	}
}

impl SseConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
		self.bind_addr = addr.into();
		self
	}

	pub fn front_origin(mut self, origin: impl Into<String>) -> Self {
		self.front_origin = origin.into();
		self
	}

	pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
		self.shutdown_timeout = timeout;
		self
	}
}
