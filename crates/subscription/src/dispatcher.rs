// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fan-out of one change event to its authorized subscribers.

use std::sync::Arc;

use livewire_type::{ChangeEvent, LookupError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::{AuthorizationResolver, ConnectionManager, Frame};

/// Outcome of a single [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
	/// Open subscribers that were authorized and in scope.
	pub matched: usize,
	/// Of those, how many had the event queued.
	pub delivered: usize,
	/// Of those, how many were disconnected because the write failed.
	pub evicted: usize,
}

#[derive(Clone)]
pub struct Dispatcher {
	connections: ConnectionManager,
	resolver: Arc<AuthorizationResolver>,
}

impl Dispatcher {
	pub fn new(connections: ConnectionManager, resolver: Arc<AuthorizationResolver>) -> Self {
		Self {
			connections,
			resolver,
		}
	}

	pub fn resolver(&self) -> &Arc<AuthorizationResolver> {
		&self.resolver
	}

	/// Queue `event` on every open subscriber allowed to see its resource.
	///
	/// A failed lookup drops the event for this dispatch only. A failed write
	/// closes that subscriber and the fan-out continues.
	pub async fn dispatch(&self, event: &ChangeEvent) -> Result<DispatchReport, LookupError> {
		let resource = event.resource_id();
		let owners = self.resolver.resolve(resource).await.inspect_err(|e| {
			warn!("Dropping event for resource {}: {}", resource, e);
		})?;

		let mut report = DispatchReport::default();
		if owners.is_empty() {
			trace!("Resource {} has no owners", resource);
			return Ok(report);
		}

		let frame = Frame::event(event);
		for subscriber in self.connections.registry().snapshot() {
			if !subscriber.is_open() || !owners.contains(&subscriber.identity()) || !subscriber.accepts(resource)
			{
				continue;
			}
			report.matched += 1;

			match subscriber.try_write(frame.clone()) {
				Ok(()) => report.delivered += 1,
				Err(e) => {
					debug!("Evicting subscriber {}: {}", subscriber.id(), e);
					if self.connections.close(subscriber.id()) {
						report.evicted += 1;
					}
				}
			}
		}

		trace!(
			"Dispatched resource {}: matched={} delivered={} evicted={}",
			resource, report.matched, report.delivered, report.evicted
		);
		Ok(report)
	}

	/// Dispatch events in arrival order until the queue closes or shutdown
	/// is signalled.
	pub async fn run(self, mut events: mpsc::Receiver<ChangeEvent>, mut shutdown: watch::Receiver<bool>) {
		info!("Dispatcher started");
		loop {
			tokio::select! {
				biased;

				_ = shutdown.changed() => {
					debug!("Dispatcher received shutdown signal");
					break;
				}

				event = events.recv() => {
					let Some(event) = event else {
						debug!("Event queue closed");
						break;
					};
					// Lookup failures are logged inside dispatch.
					let _ = self.dispatch(&event).await;
				}
			}
		}
		info!("Dispatcher stopped");
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use livewire_testing::{MemoryOwnership, StaticVerifier};
	use livewire_type::{Identity, ResourceId, SubscriberId};
	use serde_json::json;

	use super::*;
	use crate::{ResolverConfig, StreamConfig, SubscriberStream};

	struct Fixture {
		ownership: Arc<MemoryOwnership>,
		connections: ConnectionManager,
		dispatcher: Dispatcher,
	}

	fn fixture(config: StreamConfig) -> Fixture {
		let ownership = Arc::new(MemoryOwnership::new());
		let verifier = StaticVerifier::new().with_token("a", Identity(1)).with_token("b", Identity(2));
		let connections = ConnectionManager::new(Arc::new(verifier), config);
		let resolver = AuthorizationResolver::new(ownership.clone(), ResolverConfig::default().cache_ttl(Duration::ZERO));
		let dispatcher = Dispatcher::new(connections.clone(), Arc::new(resolver));
		Fixture {
			ownership,
			connections,
			dispatcher,
		}
	}

	fn event(resource: i64, level: i64) -> ChangeEvent {
		ChangeEvent::new(ResourceId(resource), json!({ "level": level }), std::time::SystemTime::now()).unwrap()
	}

	fn open(fixture: &Fixture, token: &str, scope: Option<i64>) -> SubscriberStream {
		let mut stream = fixture.connections.open(Some(token), scope.map(ResourceId)).unwrap();
		assert_eq!(stream.try_recv(), Some(Frame::Hello));
		stream
	}

	#[tokio::test]
	async fn test_only_owners_receive() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		let mut a = open(&f, "a", None);
		let mut b = open(&f, "b", None);

		let report = f.dispatcher.dispatch(&event(7, 42)).await.unwrap();
		assert_eq!(
			report,
			DispatchReport {
				matched: 1,
				delivered: 1,
				evicted: 0
			}
		);
		assert_eq!(a.try_recv(), Some(Frame::event(&event(7, 42))));
		assert_eq!(a.try_recv(), None);
		assert_eq!(b.try_recv(), None);
	}

	#[tokio::test]
	async fn test_every_connection_of_an_identity_gets_a_copy() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		let mut first = open(&f, "a", None);
		let mut second = open(&f, "a", None);

		let report = f.dispatcher.dispatch(&event(7, 1)).await.unwrap();
		assert_eq!(report.delivered, 2);
		assert!(matches!(first.try_recv(), Some(Frame::Event(_))));
		assert!(matches!(second.try_recv(), Some(Frame::Event(_))));
	}

	#[tokio::test]
	async fn test_scope_narrows() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		f.ownership.grant(Identity(1), ResourceId(8));
		let mut scoped = open(&f, "a", Some(8));

		assert_eq!(f.dispatcher.dispatch(&event(7, 1)).await.unwrap().matched, 0);
		assert_eq!(f.dispatcher.dispatch(&event(8, 1)).await.unwrap().matched, 1);
		assert_eq!(scoped.try_recv(), Some(Frame::event(&event(8, 1))));
		assert_eq!(scoped.try_recv(), None);
	}

	#[tokio::test]
	async fn test_lookup_failure_drops_event() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		let mut a = open(&f, "a", None);

		f.ownership.set_unavailable(true);
		assert!(f.dispatcher.dispatch(&event(7, 1)).await.is_err());
		assert_eq!(a.try_recv(), None);

		f.ownership.set_unavailable(false);
		assert_eq!(f.dispatcher.dispatch(&event(7, 2)).await.unwrap().delivered, 1);
		assert_eq!(a.try_recv(), Some(Frame::event(&event(7, 2))));
	}

	#[tokio::test]
	async fn test_overflow_evicts_only_slow_subscriber() {
		let f = fixture(StreamConfig::default().outbound_capacity(2));
		f.ownership.grant(Identity(1), ResourceId(7));
		f.ownership.grant(Identity(2), ResourceId(7));
		let slow = f.connections.open(Some("a"), None).unwrap();
		let mut fast = open(&f, "b", None);
		let slow_id: SubscriberId = slow.id();

		// The slow stream still holds its hello; one more frame fills it.
		let report = f.dispatcher.dispatch(&event(7, 1)).await.unwrap();
		assert_eq!(report.delivered, 2);
		assert_eq!(fast.try_recv(), Some(Frame::event(&event(7, 1))));

		let report = f.dispatcher.dispatch(&event(7, 2)).await.unwrap();
		assert_eq!(
			report,
			DispatchReport {
				matched: 2,
				delivered: 1,
				evicted: 1
			}
		);
		assert!(!f.connections.registry().contains(slow_id));
		assert_eq!(fast.try_recv(), Some(Frame::event(&event(7, 2))));

		let report = f.dispatcher.dispatch(&event(7, 3)).await.unwrap();
		assert_eq!(report.matched, 1);
		drop(slow);
	}

	#[tokio::test]
	async fn test_removed_subscriber_receives_nothing() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		let mut a = open(&f, "a", None);

		assert!(f.connections.close(a.id()));
		assert_eq!(f.dispatcher.dispatch(&event(7, 1)).await.unwrap().matched, 0);
		assert_eq!(a.recv().await, None);
	}

	#[tokio::test]
	async fn test_run_preserves_order() {
		let f = fixture(StreamConfig::default());
		f.ownership.grant(Identity(1), ResourceId(7));
		let mut a = open(&f, "a", None);

		let (tx, rx) = mpsc::channel(16);
		let (_shutdown_tx, shutdown_rx) = watch::channel(false);
		let task = tokio::spawn(f.dispatcher.clone().run(rx, shutdown_rx));

		for level in 0..10 {
			tx.send(event(7, level)).await.unwrap();
		}
		drop(tx);
		task.await.unwrap();

		for level in 0..10 {
			assert_eq!(a.try_recv(), Some(Frame::event(&event(7, level))));
		}
	}
}
