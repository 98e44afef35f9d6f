// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
	time::{Duration, SystemTime},
};

use livewire_type::ChangeEvent;
use tokio::{
	sync::{mpsc, watch},
	task::JoinHandle,
	time::sleep,
};
use tracing::{debug, error, info, warn};

use crate::{Backoff, FeedError, FeedResult, NotificationChannel, NotificationStream};

/// Set while a listener owns the upstream subscription.
static LISTENER_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Configuration for the change feed listener
#[derive(Debug, Clone)]
pub struct FeedConfig {
	/// Upstream channel name
	pub channel: String,
	/// First reconnect delay after a subscription is lost
	pub initial_backoff: Duration,
	/// Upper bound for the reconnect delay
	pub max_backoff: Duration,
	/// Capacity of the queue between the listener and its consumer
	pub queue_capacity: usize,
}

impl Default for FeedConfig {
	fn default() -> Self {
		Self {
			channel: "registros_channel".to_string(),
			initial_backoff: Duration::from_secs(1),
			max_backoff: Duration::from_secs(30),
			queue_capacity: 1024,
		}
	}
}

impl FeedConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn channel(mut self, channel: impl Into<String>) -> Self {
		self.channel = channel.into();
		self
	}

	pub fn initial_backoff(mut self, delay: Duration) -> Self {
		self.initial_backoff = delay;
		self
	}

	pub fn max_backoff(mut self, delay: Duration) -> Self {
		self.max_backoff = delay;
		self
	}

	pub fn queue_capacity(mut self, capacity: usize) -> Self {
		self.queue_capacity = capacity.max(1);
		self
	}
}

/// Counters describing what the listener has seen.
#[derive(Debug, Default)]
pub struct FeedStats {
	received: AtomicU64,
	malformed: AtomicU64,
	reconnects: AtomicU64,
	connected: AtomicBool,
}

impl FeedStats {
	pub fn received(&self) -> u64 {
		self.received.load(Ordering::Relaxed)
	}

	pub fn malformed(&self) -> u64 {
		self.malformed.load(Ordering::Relaxed)
	}

	pub fn reconnects(&self) -> u64 {
		self.reconnects.load(Ordering::Relaxed)
	}

	pub fn is_connected(&self) -> bool {
		self.connected.load(Ordering::SeqCst)
	}
}

/// Owns the upstream subscription and forwards parsed events.
pub struct ChangeFeedListener {
	source: Arc<dyn NotificationChannel>,
	config: FeedConfig,
	events: mpsc::Sender<ChangeEvent>,
	stats: Arc<FeedStats>,
}

/// Handle to a spawned listener task.
pub struct ListenerHandle {
	task: JoinHandle<()>,
}

impl ListenerHandle {
	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Wait for the listener task to exit.
	pub async fn join(self) {
		if let Err(e) = self.task.await {
			error!("Change feed listener task failed: {}", e);
		}
	}
}

/// Process-wide claim on the upstream subscription.
struct ListenerGuard;

impl ListenerGuard {
	fn acquire() -> FeedResult<Self> {
		LISTENER_ACTIVE
			.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
			.map(|_| ListenerGuard)
			.map_err(|_| FeedError::AlreadyRunning)
	}
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		LISTENER_ACTIVE.store(false, Ordering::SeqCst);
	}
}

impl ChangeFeedListener {
	pub fn new(source: Arc<dyn NotificationChannel>, config: FeedConfig, events: mpsc::Sender<ChangeEvent>) -> Self {
		Self {
			source,
			config,
			events,
			stats: Arc::new(FeedStats::default()),
		}
	}

	pub fn stats(&self) -> Arc<FeedStats> {
		self.stats.clone()
	}

	/// Whether some listener in this process currently holds the upstream
	/// claim.
	pub fn is_claimed() -> bool {
		LISTENER_ACTIVE.load(Ordering::SeqCst)
	}

	/// Establish the upstream subscription and run the listener on its own
	/// task.
	///
	/// Failing to subscribe here is returned to the caller; once running,
	/// subscription losses are handled internally. Only one listener may exist
	/// per process; a second one fails with [`FeedError::AlreadyRunning`].
	pub async fn spawn(self, shutdown: watch::Receiver<bool>) -> FeedResult<ListenerHandle> {
		let guard = ListenerGuard::acquire()?;
		let stream = self.subscribe().await?;

		let task = tokio::spawn(async move {
			let _guard = guard;
			self.run_with(stream, shutdown).await;
		});

		Ok(ListenerHandle {
			task,
		})
	}

	/// Subscribe and run on the current task until shutdown.
	///
	/// Holds the same process-wide claim as [`spawn`](Self::spawn) for the
	/// whole run.
	pub async fn run(self, shutdown: watch::Receiver<bool>) -> FeedResult<()> {
		let _guard = ListenerGuard::acquire()?;
		let stream = self.subscribe().await?;
		self.run_with(stream, shutdown).await;
		Ok(())
	}

	async fn subscribe(&self) -> FeedResult<Box<dyn NotificationStream>> {
		let stream = self.source.subscribe(&self.config.channel).await?;
		self.stats.connected.store(true, Ordering::SeqCst);
		info!("Listening on upstream channel '{}'", self.config.channel);
		Ok(stream)
	}

	async fn run_with(self, mut stream: Box<dyn NotificationStream>, mut shutdown: watch::Receiver<bool>) {
		let mut backoff = Backoff::new(self.config.initial_backoff, self.config.max_backoff);

		loop {
			if *shutdown.borrow() {
				break;
			}

			let lost = loop {
				tokio::select! {
					biased;

					changed = shutdown.changed() => {
						if changed.is_err() || *shutdown.borrow() {
							self.stop();
							return;
						}
					}

					next = stream.next_payload() => match next {
						Ok(payload) => {
							if !self.forward(&payload).await {
								self.stop();
								return;
							}
						}
						Err(e) => break e,
					}
				}
			};

			self.stats.connected.store(false, Ordering::SeqCst);
			warn!("{}; notifications published until reconnect are not recovered", lost);

			stream = loop {
				let delay = backoff.next_delay();
				debug!("Reconnecting to '{}' in {:?}", self.config.channel, delay);

				tokio::select! {
					biased;

					changed = shutdown.changed() => {
						if changed.is_err() || *shutdown.borrow() {
							self.stop();
							return;
						}
						continue;
					}

					_ = sleep(delay) => {}
				}

				match self.subscribe().await {
					Ok(stream) => {
						backoff.reset();
						self.stats.reconnects.fetch_add(1, Ordering::Relaxed);
						break stream;
					}
					Err(e) => warn!("Reconnect to '{}' failed: {}", self.config.channel, e),
				}
			};
		}

		self.stop();
	}

	/// Parse and forward one payload. Returns false once nobody consumes events.
	async fn forward(&self, payload: &str) -> bool {
		self.stats.received.fetch_add(1, Ordering::Relaxed);

		let event = match ChangeEvent::parse(payload, SystemTime::now()) {
			Ok(event) => event,
			Err(e) => {
				self.stats.malformed.fetch_add(1, Ordering::Relaxed);
				warn!("Dropping notification: {}", e);
				return true;
			}
		};

		debug!("Notification for resource {}", event.resource_id());
		if self.events.send(event).await.is_err() {
			info!("Event consumer went away, stopping change feed listener");
			return false;
		}
		true
	}

	fn stop(&self) {
		self.stats.connected.store(false, Ordering::SeqCst);
		info!("Change feed listener stopped");
	}
}
