// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Keep-alive pings for idle streams.
//!
//! Proxies and load balancers drop connections that stay silent for too long.
//! Each open subscriber gets its own ticker that writes a ping comment at a
//! fixed interval, whatever the event traffic.

use std::time::Duration;

use dashmap::DashMap;
use livewire_type::SubscriberId;
use tokio::{
	task::JoinHandle,
	time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::debug;

use crate::{Frame, MIN_HEARTBEAT_INTERVAL, Subscriber};

pub struct HeartbeatScheduler {
	interval: Duration,
	tasks: DashMap<SubscriberId, JoinHandle<()>>,
}

impl HeartbeatScheduler {
	pub fn new(interval: Duration) -> Self {
		Self {
			interval: interval.max(MIN_HEARTBEAT_INTERVAL),
			tasks: DashMap::new(),
		}
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Start pinging `subscriber`.
	///
	/// A failed ping stops the ticker and hands the subscriber id to
	/// `on_failure`; pings are never retried.
	pub fn start<F>(&self, subscriber: Subscriber, on_failure: F)
	where
		F: FnOnce(SubscriberId) + Send + 'static,
	{
		let id = subscriber.id();
		let period = self.interval;
		let pinged = subscriber.clone();
		let first = Instant::now() + period;

		let task = tokio::spawn(async move {
			let mut ticker = interval_at(first, period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				ticker.tick().await;
				if let Err(e) = pinged.try_write(Frame::ping_now()) {
					debug!("Heartbeat to subscriber {} failed: {}", id, e);
					on_failure(id);
					return;
				}
			}
		});

		if let Some(previous) = self.tasks.insert(id, task) {
			previous.abort();
		}

		// Closed before the ticker was tracked; `stop` found nothing then.
		if !subscriber.is_open() {
			self.stop(id);
		}
	}

	/// Stop pinging. Returns false if the subscriber was not tracked.
	pub fn stop(&self, id: SubscriberId) -> bool {
		match self.tasks.remove(&id) {
			Some((_, task)) => {
				task.abort();
				true
			}
			None => false,
		}
	}

	/// Number of subscribers currently being pinged.
	pub fn tracked(&self) -> usize {
		self.tasks.len()
	}

	/// Stop every ticker.
	pub fn stop_all(&self) {
		self.tasks.retain(|_, task| {
			task.abort();
			false
		});
	}
}

impl Drop for HeartbeatScheduler {
	fn drop(&mut self) {
		self.stop_all();
	}
}
