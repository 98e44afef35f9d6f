// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

/// Shortest keep-alive interval a ticker accepts.
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1);

/// Per-connection streaming behaviour.
#[derive(Debug, Clone)]
pub struct StreamConfig {
	/// Frames buffered per subscriber before it is considered too slow and
	/// disconnected.
	///
	/// Default: 64
	pub outbound_capacity: usize,

	/// Keep-alive interval. Never shorter than one millisecond.
	///
	/// Default: 25 seconds
	pub heartbeat_interval: Duration,

	/// Maximum number of simultaneously open streams.
	///
	/// Default: 1024
	pub max_connections: usize,
}

impl Default for StreamConfig {
	fn default() -> Self {
		Self {
			outbound_capacity: 64,
			heartbeat_interval: Duration::from_secs(25),
			max_connections: 1024,
		}
	}
}

impl StreamConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn outbound_capacity(mut self, capacity: usize) -> Self {
		self.outbound_capacity = capacity.max(1);
		self
	}

	pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
		self.heartbeat_interval = interval.max(MIN_HEARTBEAT_INTERVAL);
		self
	}

	pub fn max_connections(mut self, max: usize) -> Self {
		self.max_connections = max;
		self
	}
}

/// Ownership lookup behaviour.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
	/// How long a resolved owner set may be reused. Zero disables caching.
	///
	/// Default: 2 seconds
	pub cache_ttl: Duration,

	/// Upper bound on a single lookup.
	///
	/// Default: 5 seconds
	pub lookup_timeout: Duration,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self {
			cache_ttl: Duration::from_secs(2),
			lookup_timeout: Duration::from_secs(5),
		}
	}
}

impl ResolverConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;
		self
	}

	pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
		self.lookup_timeout = timeout;
		self
	}
}
