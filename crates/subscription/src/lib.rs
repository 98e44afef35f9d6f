// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Authorization-scoped fan-out of change events to streaming subscribers.
//!
//! # Flow
//!
//! ```text
//! ChangeFeedListener ──queue──▶ Dispatcher ──▶ AuthorizationResolver
//!                                   │
//!                                   ▼
//!                        SubscriberRegistry snapshot
//!                                   │
//!                    per-subscriber bounded outbound queue
//! ```
//!
//! [`ConnectionManager`] is the only way subscribers enter or leave the
//! registry. Every close trigger (client disconnect, write failure,
//! heartbeat failure, shutdown) goes through [`ConnectionManager::close`].
//!
//! Writes never block: each subscriber has a bounded queue and a full queue
//! evicts that subscriber instead of stalling the fan-out.

pub mod config;
pub mod connection;
pub mod dispatcher;
pub mod frame;
pub mod heartbeat;
pub mod registry;
pub mod resolver;
pub mod subscriber;
pub mod subsystem;

pub use config::{MIN_HEARTBEAT_INTERVAL, ResolverConfig, StreamConfig};
pub use connection::{ConnectError, ConnectionManager, SubscriberStream};
pub use dispatcher::{DispatchReport, Dispatcher};
pub use frame::Frame;
pub use heartbeat::HeartbeatScheduler;
pub use registry::SubscriberRegistry;
pub use resolver::AuthorizationResolver;
pub use subscriber::{ConnectionState, Subscriber};
pub use subsystem::FeedSubsystem;
