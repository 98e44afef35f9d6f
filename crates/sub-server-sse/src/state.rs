// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use livewire_subscription::ConnectionManager;

use crate::SseConfig;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
	connections: ConnectionManager,
	config: Arc<SseConfig>,
}

impl AppState {
	pub fn new(connections: ConnectionManager, config: SseConfig) -> Self {
		Self {
			connections,
			config: Arc::new(config),
		}
	}

	pub fn connections(&self) -> &ConnectionManager {
		&self.connections
	}

	pub fn config(&self) -> &SseConfig {
		&self.config
	}
}
