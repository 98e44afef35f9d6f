// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt,
	sync::{
		Arc,
		atomic::{AtomicU8, Ordering},
	},
	time::SystemTime,
};

use livewire_type::{ConnectionWriteError, Identity, ResourceId, SubscriberId};
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::Frame;

/// Lifecycle of a streaming connection. Transitions only move forward.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
	Pending = 0,
	Open = 1,
	Closing = 2,
	Closed = 3,
}

impl ConnectionState {
	fn from_u8(value: u8) -> Self {
		match value {
			0 => ConnectionState::Pending,
			1 => ConnectionState::Open,
			2 => ConnectionState::Closing,
			_ => ConnectionState::Closed,
		}
	}
}

/// One authenticated streaming connection.
///
/// Cheap to clone; clones share the outbound queue and state.
#[derive(Clone)]
pub struct Subscriber {
	inner: Arc<SubscriberInner>,
}

struct SubscriberInner {
	id: SubscriberId,
	identity: Identity,
	scope: Option<ResourceId>,
	opened_at: SystemTime,
	state: AtomicU8,
	// The only sender of the stream. Taking it ends the stream once the
	// queued frames are drained, and rejects every later write.
	outbound: Mutex<Option<mpsc::Sender<Frame>>>,
}

impl Subscriber {
	pub(crate) fn new(identity: Identity, scope: Option<ResourceId>, outbound: mpsc::Sender<Frame>) -> Self {
		Self {
			inner: Arc::new(SubscriberInner {
				id: SubscriberId::generate(),
				identity,
				scope,
				opened_at: SystemTime::now(),
				state: AtomicU8::new(ConnectionState::Pending as u8),
				outbound: Mutex::new(Some(outbound)),
			}),
		}
	}

	pub fn id(&self) -> SubscriberId {
		self.inner.id
	}

	pub fn identity(&self) -> Identity {
		self.inner.identity
	}

	/// Resource the client narrowed its stream to, if any.
	pub fn scope(&self) -> Option<ResourceId> {
		self.inner.scope
	}

	pub fn opened_at(&self) -> SystemTime {
		self.inner.opened_at
	}

	pub fn state(&self) -> ConnectionState {
		ConnectionState::from_u8(self.inner.state.load(Ordering::SeqCst))
	}

	pub fn is_open(&self) -> bool {
		self.state() == ConnectionState::Open
	}

	/// Whether events about `resource` belong on this stream, authorization
	/// aside.
	pub fn accepts(&self, resource: ResourceId) -> bool {
		self.inner.scope.is_none_or(|scope| scope == resource)
	}

	/// Queue a frame without waiting.
	pub fn try_write(&self, frame: Frame) -> Result<(), ConnectionWriteError> {
		let outbound = self.inner.outbound.lock();
		let Some(tx) = outbound.as_ref() else {
			return Err(ConnectionWriteError::Closed);
		};
		tx.try_send(frame).map_err(|e| match e {
			mpsc::error::TrySendError::Full(_) => ConnectionWriteError::Overflow,
			mpsc::error::TrySendError::Closed(_) => ConnectionWriteError::Closed,
		})
	}

	pub(crate) fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
		debug_assert!(from < to);
		self.inner.state.compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst).is_ok()
	}

	pub(crate) fn hang_up(&self) {
		self.inner.outbound.lock().take();
	}
}

impl fmt::Debug for Subscriber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscriber")
			.field("id", &self.inner.id)
			.field("identity", &self.inner.identity)
			.field("scope", &self.inner.scope)
			.field("state", &self.state())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_write_and_overflow() {
		let (tx, mut rx) = mpsc::channel(1);
		let subscriber = Subscriber::new(Identity(1), None, tx);

		assert_eq!(subscriber.try_write(Frame::Hello), Ok(()));
		assert_eq!(subscriber.try_write(Frame::Ping(1)), Err(ConnectionWriteError::Overflow));
		assert_eq!(rx.try_recv().unwrap(), Frame::Hello);
	}

	#[test]
	fn test_write_after_peer_gone() {
		let (tx, rx) = mpsc::channel(4);
		let subscriber = Subscriber::new(Identity(1), None, tx);
		drop(rx);
		assert_eq!(subscriber.try_write(Frame::Hello), Err(ConnectionWriteError::Closed));
	}

	#[test]
	fn test_hang_up_ends_stream() {
		let (tx, mut rx) = mpsc::channel(4);
		let subscriber = Subscriber::new(Identity(1), None, tx);
		subscriber.try_write(Frame::Hello).unwrap();
		subscriber.clone().hang_up();

		assert_eq!(subscriber.try_write(Frame::Ping(1)), Err(ConnectionWriteError::Closed));
		assert_eq!(rx.try_recv().unwrap(), Frame::Hello);
		assert_eq!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
	}

	#[test]
	fn test_transitions_are_one_directional() {
		let (tx, _rx) = mpsc::channel(1);
		let subscriber = Subscriber::new(Identity(1), None, tx);
		assert_eq!(subscriber.state(), ConnectionState::Pending);

		assert!(subscriber.transition(ConnectionState::Pending, ConnectionState::Open));
		assert!(!subscriber.transition(ConnectionState::Pending, ConnectionState::Open));
		assert!(subscriber.transition(ConnectionState::Open, ConnectionState::Closing));
		assert!(!subscriber.transition(ConnectionState::Open, ConnectionState::Closing));
		assert!(subscriber.transition(ConnectionState::Closing, ConnectionState::Closed));
		assert_eq!(subscriber.state(), ConnectionState::Closed);
	}

	#[test]
	fn test_scope() {
		let (tx, _rx) = mpsc::channel(1);
		let unscoped = Subscriber::new(Identity(1), None, tx.clone());
		let scoped = Subscriber::new(Identity(1), Some(ResourceId(7)), tx);

		assert!(unscoped.accepts(ResourceId(7)));
		assert!(unscoped.accepts(ResourceId(9)));
		assert!(scoped.accepts(ResourceId(7)));
		assert!(!scoped.accepts(ResourceId(9)));
	}
}
