// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use async_trait::async_trait;

use crate::FeedResult;

/// A named publish/subscribe channel the listener can subscribe to.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
	async fn subscribe(&self, channel: &str) -> FeedResult<Box<dyn NotificationStream>>;
}

/// One live subscription.
#[async_trait]
pub trait NotificationStream: Send {
	/// Wait for the next raw payload.
	///
	/// An error means the subscription is gone and must be re-established
	/// through [`NotificationChannel::subscribe`].
	async fn next_payload(&mut self) -> FeedResult<String>;
}
