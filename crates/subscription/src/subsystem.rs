// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Feed subsystem: the upstream listener and the dispatch loop as one
//! lifecycle unit.

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use livewire_cdc::{ChangeFeedListener, FeedConfig, FeedStats, ListenerHandle, NotificationChannel};
use livewire_sub_api::{HealthStatus, Subsystem, SubsystemError};
use tokio::{
	sync::{mpsc, watch},
	task::JoinHandle,
};
use tracing::{error, info};

use crate::Dispatcher;

pub struct FeedSubsystem {
	source: Arc<dyn NotificationChannel>,
	config: FeedConfig,
	dispatcher: Dispatcher,
	running: Arc<AtomicBool>,
	stats: Option<Arc<FeedStats>>,
	shutdown_tx: Option<watch::Sender<bool>>,
	listener: Option<ListenerHandle>,
	dispatch: Option<JoinHandle<()>>,
}

impl FeedSubsystem {
	pub fn new(source: Arc<dyn NotificationChannel>, config: FeedConfig, dispatcher: Dispatcher) -> Self {
		Self {
			source,
			config,
			dispatcher,
			running: Arc::new(AtomicBool::new(false)),
			stats: None,
			shutdown_tx: None,
			listener: None,
			dispatch: None,
		}
	}

	/// Listener counters, available after start.
	pub fn stats(&self) -> Option<Arc<FeedStats>> {
		self.stats.clone()
	}
}

#[async_trait]
impl Subsystem for FeedSubsystem {
	fn name(&self) -> &'static str {
		"Feed"
	}

	async fn start(&mut self) -> livewire_sub_api::Result<()> {
		if self.running.load(Ordering::SeqCst) {
			return Ok(());
		}

		let (events_tx, events_rx) = mpsc::channel(self.config.queue_capacity);
		let (shutdown_tx, shutdown_rx) = watch::channel(false);

		let listener = ChangeFeedListener::new(self.source.clone(), self.config.clone(), events_tx);
		let stats = listener.stats();
		let handle = listener.spawn(shutdown_rx.clone()).await.map_err(|e| SubsystemError::Start {
			subsystem: "Feed",
			reason: e.to_string(),
		})?;

		let dispatcher = self.dispatcher.clone();
		let running = self.running.clone();
		let dispatch = tokio::spawn(async move {
			dispatcher.run(events_rx, shutdown_rx).await;
			running.store(false, Ordering::SeqCst);
		});

		self.running.store(true, Ordering::SeqCst);
		self.stats = Some(stats);
		self.shutdown_tx = Some(shutdown_tx);
		self.listener = Some(handle);
		self.dispatch = Some(dispatch);

		info!("Feed subsystem listening on channel {}", self.config.channel);
		Ok(())
	}

	async fn shutdown(&mut self) -> livewire_sub_api::Result<()> {
		if let Some(tx) = self.shutdown_tx.take() {
			let _ = tx.send(true);
		}
		if let Some(listener) = self.listener.take() {
			listener.join().await;
		}
		if let Some(dispatch) = self.dispatch.take() {
			if let Err(e) = dispatch.await {
				error!("Dispatch task failed: {}", e);
			}
		}
		self.running.store(false, Ordering::SeqCst);
		info!("Feed subsystem stopped");
		Ok(())
	}

	fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	fn health_status(&self) -> HealthStatus {
		if !self.running.load(Ordering::SeqCst) {
			return HealthStatus::Failed {
				description: "Not running".to_string(),
			};
		}
		match &self.stats {
			Some(stats) if stats.is_connected() => HealthStatus::Healthy,
			Some(_) => HealthStatus::Degraded {
				description: "Upstream subscription lost, reconnecting".to_string(),
			},
			None => HealthStatus::Unknown,
		}
	}
}
