// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! `LISTEN`/`NOTIFY` adapter.

use async_trait::async_trait;
use sqlx::postgres::PgListener;
use tracing::debug;

use crate::{FeedError, FeedResult, NotificationChannel, NotificationStream};

/// Subscribes to a Postgres notification channel.
///
/// Every subscription opens its own dedicated connection.
#[derive(Debug, Clone)]
pub struct PgNotificationChannel {
	url: String,
}

impl PgNotificationChannel {
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
		}
	}
}

#[async_trait]
impl NotificationChannel for PgNotificationChannel {
	async fn subscribe(&self, channel: &str) -> FeedResult<Box<dyn NotificationStream>> {
		let mut listener = PgListener::connect(&self.url).await.map_err(|e| FeedError::Connect(e.to_string()))?;
		listener.listen(channel).await.map_err(|e| FeedError::Connect(e.to_string()))?;
		debug!("LISTEN {} established", channel);

		Ok(Box::new(PgNotificationStream {
			listener,
		}))
	}
}

struct PgNotificationStream {
	listener: PgListener,
}

#[async_trait]
impl NotificationStream for PgNotificationStream {
	async fn next_payload(&mut self) -> FeedResult<String> {
		// `try_recv` reports a dropped connection as `None` instead of silently
		// reconnecting, so the listener sees every outage.
		match self.listener.try_recv().await {
			Ok(Some(notification)) => Ok(notification.payload().to_string()),
			Ok(None) => Err(FeedError::SubscriptionLost("connection closed".to_string())),
			Err(e) => Err(FeedError::SubscriptionLost(e.to_string())),
		}
	}
}
