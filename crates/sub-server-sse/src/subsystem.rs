// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Streaming server subsystem implementing the livewire Subsystem trait.
//!
//! This module provides `SseSubsystem` which manages the lifecycle of the
//! HTTP server, including startup, health monitoring, and graceful shutdown.

use std::{
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
};

use async_trait::async_trait;
use livewire_sub_api::{HealthStatus, Subsystem, SubsystemError};
use parking_lot::RwLock;
use tokio::{net::TcpListener, sync::oneshot, time::timeout};

use crate::{AppState, routes::router};

/// Streaming HTTP server subsystem.
///
/// Streams never end on their own, so a plain graceful shutdown would wait
/// forever. Shutdown first stops accepting, then closes every open stream
/// through the connection manager, then waits for the server to drain within
/// the configured deadline.
pub struct SseSubsystem {
	/// Shared application state.
	state: AppState,
	/// Actual bound address (available after start).
	actual_addr: RwLock<Option<SocketAddr>>,
	/// Flag indicating if the server is running.
	running: Arc<AtomicBool>,
	/// Channel to send shutdown signal.
	shutdown_tx: Option<oneshot::Sender<()>>,
	/// Channel to receive shutdown completion.
	shutdown_complete_rx: Option<oneshot::Receiver<()>>,
}

impl SseSubsystem {
	pub fn new(state: AppState) -> Self {
		Self {
			state,
			actual_addr: RwLock::new(None),
			running: Arc::new(AtomicBool::new(false)),
			shutdown_tx: None,
			shutdown_complete_rx: None,
		}
	}

	/// Get the bind address.
	pub fn bind_addr(&self) -> &str {
		&self.state.config().bind_addr
	}

	/// Get the actual bound address (available after start).
	pub fn local_addr(&self) -> Option<SocketAddr> {
		*self.actual_addr.read()
	}

	/// Get the actual bound port (available after start).
	pub fn port(&self) -> Option<u16> {
		self.local_addr().map(|a| a.port())
	}
}

#[async_trait]
impl Subsystem for SseSubsystem {
	fn name(&self) -> &'static str {
		"Sse"
	}

	async fn start(&mut self) -> livewire_sub_api::Result<()> {
		// Idempotent: if already running, return success
		if self.running.load(Ordering::SeqCst) {
			return Ok(());
		}

		let addr = self.state.config().bind_addr.clone();
		let listener = TcpListener::bind(&addr).await.map_err(|source| SubsystemError::Bind {
			addr: addr.clone(),
			source,
		})?;
		let actual_addr = listener.local_addr().map_err(|source| SubsystemError::Bind {
			addr: addr.clone(),
			source,
		})?;
		*self.actual_addr.write() = Some(actual_addr);
		tracing::info!("Streaming server bound to {}", actual_addr);

		let (shutdown_tx, shutdown_rx) = oneshot::channel();
		let (complete_tx, complete_rx) = oneshot::channel();

		let app = router(self.state.clone());
		let running = self.running.clone();
		running.store(true, Ordering::SeqCst);

		tokio::spawn(async move {
			let server = axum::serve(listener, app).with_graceful_shutdown(async {
				shutdown_rx.await.ok();
				tracing::info!("Streaming server received shutdown signal");
			});

			if let Err(e) = server.await {
				tracing::error!("Streaming server error: {}", e);
			}

			running.store(false, Ordering::SeqCst);
			let _ = complete_tx.send(());
			tracing::info!("Streaming server stopped");
		});

		self.shutdown_tx = Some(shutdown_tx);
		self.shutdown_complete_rx = Some(complete_rx);
		Ok(())
	}

	async fn shutdown(&mut self) -> livewire_sub_api::Result<()> {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(());
		}

		self.state.connections().close_all();

		if let Some(rx) = self.shutdown_complete_rx.take() {
			let deadline = self.state.config().shutdown_timeout;
			if timeout(deadline, rx).await.is_err() {
				tracing::warn!("Streaming server did not drain within {:?}", deadline);
			}
		}
		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	fn health_status(&self) -> HealthStatus {
		if self.running.load(Ordering::SeqCst) {
			HealthStatus::Healthy
		} else if self.shutdown_tx.is_some() {
			HealthStatus::Warning {
				description: "Server task exited".to_string(),
			}
		} else {
			HealthStatus::Failed {
				description: "Not running".to_string(),
			}
		}
	}
}
