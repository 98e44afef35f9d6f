// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Fan-out behaviour across connection, authorization and dispatch

use std::{sync::Arc, time::Duration};

use livewire_subscription::{
	AuthorizationResolver, ConnectionManager, DispatchReport, Dispatcher, Frame, ResolverConfig, StreamConfig,
	SubscriberStream,
};
use livewire_testing::{MemoryOwnership, StaticVerifier};
use livewire_type::{ChangeEvent, Identity, ResourceId};
use serde_json::json;
use tokio::time::advance;

struct Harness {
	ownership: Arc<MemoryOwnership>,
	connections: ConnectionManager,
	dispatcher: Dispatcher,
}

impl Harness {
	fn new(config: StreamConfig) -> Self {
		let ownership = Arc::new(MemoryOwnership::new());
		let verifier = StaticVerifier::new()
			.with_token("token-a", Identity(1))
			.with_token("token-b", Identity(2))
			.with_token("token-c", Identity(3));
		let connections = ConnectionManager::new(Arc::new(verifier), config);
		let resolver =
			AuthorizationResolver::new(ownership.clone(), ResolverConfig::default().cache_ttl(Duration::ZERO));
		let dispatcher = Dispatcher::new(connections.clone(), Arc::new(resolver));
		Self {
			ownership,
			connections,
			dispatcher,
		}
	}

	fn connect(&self, token: &str) -> SubscriberStream {
		let mut stream = self.connections.open(Some(token), None).unwrap();
		assert_eq!(stream.try_recv(), Some(Frame::Hello));
		stream
	}
}

fn level_event(resource: i64, level: i64) -> ChangeEvent {
	ChangeEvent::new(ResourceId(resource), json!({ "level": level }), std::time::SystemTime::now()).unwrap()
}

fn drain(stream: &mut SubscriberStream) -> Vec<String> {
	let mut frames = Vec::new();
	while let Some(frame) = stream.try_recv() {
		frames.push(frame.encode());
	}
	frames
}

#[tokio::test]
async fn test_authorized_subscriber_receives_exactly_one_copy() {
	let h = Harness::new(StreamConfig::default());
	h.ownership.grant(Identity(1), ResourceId(7));
	h.ownership.grant(Identity(2), ResourceId(9));
	let mut a = h.connect("token-a");
	let mut b = h.connect("token-b");

	h.dispatcher.dispatch(&level_event(7, 42)).await.unwrap();

	assert_eq!(drain(&mut a), vec!["data: {\"resourceId\":7,\"record\":{\"level\":42}}\n\n"]);
	assert!(drain(&mut b).is_empty());
}

#[tokio::test]
async fn test_disconnected_subscriber_gets_nothing_and_others_are_unaffected() {
	let h = Harness::new(StreamConfig::default());
	h.ownership.grant(Identity(1), ResourceId(7));
	h.ownership.grant(Identity(3), ResourceId(7));
	let mut a = h.connect("token-a");
	let c = h.connect("token-c");
	let c_id = c.id();

	// Client goes away.
	drop(c);
	assert!(!h.connections.registry().contains(c_id));

	let report = h.dispatcher.dispatch(&level_event(7, 1)).await.unwrap();
	assert_eq!(
		report,
		DispatchReport {
			matched: 1,
			delivered: 1,
			evicted: 0
		}
	);
	assert_eq!(drain(&mut a).len(), 1);
}

#[tokio::test]
async fn test_events_for_a_resource_arrive_in_order() {
	let h = Harness::new(StreamConfig::default().outbound_capacity(256));
	h.ownership.grant(Identity(1), ResourceId(7));
	h.ownership.grant(Identity(1), ResourceId(8));
	let mut a = h.connect("token-a");

	for level in 0..50 {
		h.dispatcher.dispatch(&level_event(7, level)).await.unwrap();
		h.dispatcher.dispatch(&level_event(8, level)).await.unwrap();
	}

	let frames = drain(&mut a);
	let of_seven: Vec<_> = frames.iter().filter(|f| f.contains("\"resourceId\":7")).cloned().collect();
	let expected: Vec<_> = (0..50).map(|level| Frame::event(&level_event(7, level)).encode()).collect();
	assert_eq!(of_seven, expected);
}

#[tokio::test]
async fn test_revoked_ownership_stops_delivery() {
	let h = Harness::new(StreamConfig::default());
	h.ownership.grant(Identity(1), ResourceId(7));
	let mut a = h.connect("token-a");

	h.dispatcher.dispatch(&level_event(7, 1)).await.unwrap();
	h.ownership.revoke(Identity(1), ResourceId(7));
	h.dispatcher.dispatch(&level_event(7, 2)).await.unwrap();

	assert_eq!(drain(&mut a), vec![Frame::event(&level_event(7, 1)).encode()]);
}

#[tokio::test]
async fn test_slow_subscriber_is_disconnected() {
	let h = Harness::new(StreamConfig::default().outbound_capacity(4));
	h.ownership.grant(Identity(1), ResourceId(7));
	h.ownership.grant(Identity(2), ResourceId(7));
	let slow = h.connections.open(Some("token-a"), None).unwrap();
	let mut fast = h.connect("token-b");

	let mut evicted = 0;
	for level in 0..10 {
		evicted += h.dispatcher.dispatch(&level_event(7, level)).await.unwrap().evicted;
		drain(&mut fast);
	}

	assert_eq!(evicted, 1);
	assert!(!h.connections.registry().contains(slow.id()));
	assert_eq!(h.connections.active(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_on_idle_stream() {
	let h = Harness::new(StreamConfig::default().heartbeat_interval(Duration::from_secs(25)));
	let mut a = h.connect("token-a");

	for _ in 0..3 {
		advance(Duration::from_secs(25)).await;
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
	}

	let frames = drain(&mut a);
	assert_eq!(frames.len(), 3);
	assert!(frames.iter().all(|f| f.starts_with(": ping ") && f.ends_with("\n\n")));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_independent_of_event_traffic() {
	let h = Harness::new(StreamConfig::default().outbound_capacity(1024));
	h.ownership.grant(Identity(1), ResourceId(7));
	let mut a = h.connect("token-a");

	for second in 0..50 {
		h.dispatcher.dispatch(&level_event(7, second)).await.unwrap();
		advance(Duration::from_secs(1)).await;
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
	}

	let frames = drain(&mut a);
	let pings = frames.iter().filter(|f| f.starts_with(": ping ")).count();
	let events = frames.iter().filter(|f| f.starts_with("data: ")).count();
	assert_eq!(pings, 2);
	assert_eq!(events, 50);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_stops_after_close() {
	let h = Harness::new(StreamConfig::default());
	let mut a = h.connect("token-a");

	assert!(h.connections.close(a.id()));
	advance(Duration::from_secs(100)).await;
	tokio::task::yield_now().await;

	assert_eq!(a.recv().await, None);
}

#[tokio::test]
async fn test_shutdown_closes_everyone() {
	let h = Harness::new(StreamConfig::default());
	let mut streams: Vec<_> = ["token-a", "token-b", "token-c"].iter().map(|t| h.connect(t)).collect();

	assert_eq!(h.connections.close_all(), 3);
	for stream in streams.iter_mut() {
		assert_eq!(stream.recv().await, None);
	}
	assert!(h.connections.registry().is_empty());
}
