// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Admission and removal of streaming connections.

use std::{
	pin::Pin,
	sync::{
		Arc, Weak,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	task::{Context, Poll},
};

use futures_util::Stream;
use livewire_auth::TokenVerifier;
use livewire_type::{AuthenticationError, ResourceId, SubscriberId};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{ConnectionState, Frame, HeartbeatScheduler, StreamConfig, Subscriber, SubscriberRegistry};

/// Why a connection was refused. Nothing is registered in either case.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConnectError {
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),

	#[error("connection limit of {max} reached")]
	AtCapacity {
		max: usize,
	},

	#[error("server is shutting down")]
	ShuttingDown,
}

/// Owns the subscriber lifecycle.
///
/// Cheap to clone. All clones share the registry, the heartbeat tickers and
/// the connection count.
#[derive(Clone)]
pub struct ConnectionManager {
	inner: Arc<ManagerInner>,
}

struct ManagerInner {
	config: StreamConfig,
	verifier: Arc<dyn TokenVerifier>,
	registry: Arc<SubscriberRegistry>,
	heartbeat: HeartbeatScheduler,
	active: AtomicUsize,
	shutting_down: AtomicBool,
}

impl ConnectionManager {
	pub fn new(verifier: Arc<dyn TokenVerifier>, config: StreamConfig) -> Self {
		let heartbeat = HeartbeatScheduler::new(config.heartbeat_interval);
		Self {
			inner: Arc::new(ManagerInner {
				config,
				verifier,
				registry: Arc::new(SubscriberRegistry::new()),
				heartbeat,
				active: AtomicUsize::new(0),
				shutting_down: AtomicBool::new(false),
			}),
		}
	}

	pub fn config(&self) -> &StreamConfig {
		&self.inner.config
	}

	pub fn registry(&self) -> &Arc<SubscriberRegistry> {
		&self.inner.registry
	}

	/// Number of open connections.
	pub fn active(&self) -> usize {
		self.inner.active.load(Ordering::SeqCst)
	}

	/// Whether [`close_all`](Self::close_all) has run. New connections are
	/// refused from then on.
	pub fn is_shutting_down(&self) -> bool {
		self.inner.shutting_down.load(Ordering::SeqCst)
	}

	/// Admit a new connection.
	///
	/// The returned stream yields the hello marker first, then events and
	/// pings. Dropping it closes the connection.
	///
	/// Must be called from within a tokio runtime.
	pub fn open(&self, token: Option<&str>, scope: Option<ResourceId>) -> Result<SubscriberStream, ConnectError> {
		let Some(token) = token.filter(|t| !t.is_empty()) else {
			return Err(AuthenticationError::MissingCredentials.into());
		};
		let identity = self.inner.verifier.verify(token)?;
		if self.is_shutting_down() {
			return Err(ConnectError::ShuttingDown);
		}

		let max = self.inner.config.max_connections;
		self.inner
			.active
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| (n < max).then_some(n + 1))
			.map_err(|_| ConnectError::AtCapacity {
				max,
			})?;

		let (tx, rx) = mpsc::channel(self.inner.config.outbound_capacity);
		let subscriber = Subscriber::new(identity, scope, tx);

		// Queue is fresh and has room for at least one frame.
		let _ = subscriber.try_write(Frame::Hello);

		subscriber.transition(ConnectionState::Pending, ConnectionState::Open);
		self.inner.registry.insert(subscriber.clone());

		// close_all may have taken its snapshot before the insert.
		if self.is_shutting_down() {
			self.inner.close(subscriber.id());
			return Err(ConnectError::ShuttingDown);
		}

		let manager = Arc::downgrade(&self.inner);
		self.inner.heartbeat.start(subscriber.clone(), move |id| {
			if let Some(manager) = manager.upgrade() {
				manager.close(id);
			}
		});

		info!(
			"Subscriber {} opened for identity {}{}",
			subscriber.id(),
			identity,
			scope.map(|r| format!(" scoped to resource {}", r)).unwrap_or_default()
		);

		Ok(SubscriberStream {
			frames: rx,
			subscriber,
			manager: Arc::downgrade(&self.inner),
		})
	}

	/// Deregister a subscriber and end its stream.
	///
	/// Returns true only for the call that actually closed it; redundant calls
	/// from other close triggers are no-ops.
	pub fn close(&self, id: SubscriberId) -> bool {
		self.inner.close(id)
	}

	/// Close every open connection and refuse new ones. Returns how many were
	/// closed.
	pub fn close_all(&self) -> usize {
		self.inner.shutting_down.store(true, Ordering::SeqCst);
		let closed = self.inner.registry.snapshot().into_iter().filter(|s| self.inner.close(s.id())).count();
		if closed > 0 {
			info!("Closed {} subscriber(s)", closed);
		}
		closed
	}
}

impl ManagerInner {
	fn close(&self, id: SubscriberId) -> bool {
		let Some(subscriber) = self.registry.get(id) else {
			return false;
		};
		if !subscriber.transition(ConnectionState::Open, ConnectionState::Closing) {
			return false;
		}

		self.registry.remove(id);
		self.heartbeat.stop(id);
		subscriber.hang_up();
		subscriber.transition(ConnectionState::Closing, ConnectionState::Closed);
		self.active.fetch_sub(1, Ordering::SeqCst);

		debug!("Subscriber {} closed", id);
		true
	}
}

/// Outbound side of one connection, consumed by the HTTP body.
///
/// Ends after the connection is closed and its queued frames are drained.
pub struct SubscriberStream {
	frames: mpsc::Receiver<Frame>,
	subscriber: Subscriber,
	manager: Weak<ManagerInner>,
}

impl SubscriberStream {
	pub fn id(&self) -> SubscriberId {
		self.subscriber.id()
	}

	pub fn subscriber(&self) -> &Subscriber {
		&self.subscriber
	}

	pub async fn recv(&mut self) -> Option<Frame> {
		self.frames.recv().await
	}

	pub fn try_recv(&mut self) -> Option<Frame> {
		self.frames.try_recv().ok()
	}
}

impl Stream for SubscriberStream {
	type Item = Frame;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Frame>> {
		self.frames.poll_recv(cx)
	}
}

impl Drop for SubscriberStream {
	fn drop(&mut self) {
		match self.manager.upgrade() {
			Some(manager) => {
				manager.close(self.subscriber.id());
			}
			None => self.subscriber.hang_up(),
		}
	}
}
