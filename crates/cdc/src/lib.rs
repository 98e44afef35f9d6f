// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Upstream change feed consumption.
//!
//! A single [`ChangeFeedListener`] per process holds the subscription to the
//! upstream notification channel, turns every payload into a
//! [`ChangeEvent`](livewire_type::ChangeEvent), and forwards it over a bounded
//! queue to whoever dispatches events.
//!
//! Delivery is at-most-once. Notifications produced while the subscription is
//! down are gone; the listener reconnects with capped exponential backoff and
//! resumes with whatever is published next.

pub mod backoff;
pub mod channel;
pub mod error;
pub mod listener;
pub mod postgres;

pub use backoff::Backoff;
pub use channel::{NotificationChannel, NotificationStream};
pub use error::{FeedError, FeedResult};
pub use listener::{ChangeFeedListener, FeedConfig, FeedStats, ListenerHandle};
pub use postgres::PgNotificationChannel;
