// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use async_trait::async_trait;
use livewire_cdc::{FeedError, FeedResult, NotificationChannel, NotificationStream};
use parking_lot::Mutex;
use tokio::sync::mpsc;

type Sender = mpsc::UnboundedSender<FeedResult<String>>;

/// Upstream channel whose subscriptions are driven by the test.
#[derive(Clone, Default)]
pub struct ScriptedChannel {
	state: Arc<Mutex<ScriptState>>,
}

#[derive(Default)]
struct ScriptState {
	failures_left: usize,
	subscriptions: usize,
	channels: Vec<String>,
	current: Option<Sender>,
}

impl ScriptedChannel {
	pub fn new() -> Self {
		Self::default()
	}

	/// Refuse the next `n` subscribe attempts.
	pub fn fail_next_subscribes(&self, n: usize) {
		self.state.lock().failures_left = n;
	}

	/// Publish on the live subscription. Returns false while there is none,
	/// in which case the payload is lost.
	pub fn publish(&self, payload: impl Into<String>) -> bool {
		let state = self.state.lock();
		match &state.current {
			Some(tx) => tx.send(Ok(payload.into())).is_ok(),
			None => false,
		}
	}

	/// Break the live subscription.
	pub fn drop_subscription(&self) {
		if let Some(tx) = self.state.lock().current.take() {
			let _ = tx.send(Err(FeedError::SubscriptionLost("connection reset by peer".to_string())));
		}
	}

	/// Successful subscribe calls so far.
	pub fn subscriptions(&self) -> usize {
		self.state.lock().subscriptions
	}

	pub fn is_subscribed(&self) -> bool {
		self.state.lock().current.as_ref().is_some_and(|tx| !tx.is_closed())
	}

	/// Channel names subscribed to, in order.
	pub fn channels(&self) -> Vec<String> {
		self.state.lock().channels.clone()
	}
}

#[async_trait]
impl NotificationChannel for ScriptedChannel {
	async fn subscribe(&self, channel: &str) -> FeedResult<Box<dyn NotificationStream>> {
		let mut state = self.state.lock();
		if state.failures_left > 0 {
			state.failures_left -= 1;
			return Err(FeedError::Connect("connection refused".to_string()));
		}

		let (tx, rx) = mpsc::unbounded_channel();
		state.current = Some(tx);
		state.subscriptions += 1;
		state.channels.push(channel.to_string());

		Ok(Box::new(ScriptedStream {
			rx,
		}))
	}
}

struct ScriptedStream {
	rx: mpsc::UnboundedReceiver<FeedResult<String>>,
}

#[async_trait]
impl NotificationStream for ScriptedStream {
	async fn next_payload(&mut self) -> FeedResult<String> {
		match self.rx.recv().await {
			Some(item) => item,
			None => Err(FeedError::SubscriptionLost("channel closed".to_string())),
		}
	}
}
