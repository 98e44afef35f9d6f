// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Upstream notification to subscriber stream, end to end

use std::{sync::Arc, time::Duration};

use livewire_cdc::{ChangeFeedListener, FeedConfig};
use livewire_sub_api::{HealthStatus, Subsystem};
use livewire_subscription::{
	AuthorizationResolver, ConnectionManager, Dispatcher, FeedSubsystem, Frame, ResolverConfig, StreamConfig,
	SubscriberStream,
};
use livewire_testing::{
	MemoryOwnership, ScriptedChannel, StaticVerifier,
	util::{listener_slot, wait_for},
};
use livewire_type::{Identity, ResourceId};
use serde_json::json;
use tokio::{
	sync::{mpsc, watch},
	time::timeout,
};

const WITHIN: Duration = Duration::from_secs(2);

fn fast_feed() -> FeedConfig {
	FeedConfig::new().initial_backoff(Duration::from_millis(5)).max_backoff(Duration::from_millis(20))
}

fn setup() -> (Arc<MemoryOwnership>, ConnectionManager, Dispatcher) {
	let ownership = Arc::new(MemoryOwnership::new());
	ownership.grant(Identity(1), ResourceId(7));
	ownership.grant(Identity(2), ResourceId(9));

	let verifier = StaticVerifier::new().with_token("token-a", Identity(1)).with_token("token-b", Identity(2));
	let connections = ConnectionManager::new(Arc::new(verifier), StreamConfig::default());
	let resolver = AuthorizationResolver::new(ownership.clone(), ResolverConfig::default());
	let dispatcher = Dispatcher::new(connections.clone(), Arc::new(resolver));
	(ownership, connections, dispatcher)
}

async fn next_encoded(stream: &mut SubscriberStream) -> String {
	timeout(WITHIN, stream.recv()).await.expect("frame within deadline").expect("stream open").encode()
}

fn legacy_payload(resource: i64, level: i64) -> String {
	json!({"reservatorio_id": resource, "registro": {"level": level}}).to_string()
}

#[tokio::test]
async fn test_listener_to_stream_survives_reconnect() {
	let _slot = listener_slot().await;
	let (_, connections, dispatcher) = setup();
	let channel = ScriptedChannel::new();

	let (events_tx, events_rx) = mpsc::channel(16);
	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let listener = ChangeFeedListener::new(Arc::new(channel.clone()), fast_feed(), events_tx)
		.spawn(shutdown_rx.clone())
		.await
		.unwrap();
	let dispatch = tokio::spawn(dispatcher.run(events_rx, shutdown_rx));

	let mut a = connections.open(Some("token-a"), None).unwrap();
	let mut b = connections.open(Some("token-b"), None).unwrap();
	assert_eq!(a.recv().await, Some(Frame::Hello));
	assert_eq!(b.recv().await, Some(Frame::Hello));

	wait_for(|| channel.is_subscribed(), "listener should subscribe").await;
	assert!(channel.publish(legacy_payload(7, 42)));
	assert_eq!(next_encoded(&mut a).await, "data: {\"resourceId\":7,\"record\":{\"level\":42}}\n\n");

	channel.drop_subscription();
	assert!(!channel.publish(legacy_payload(7, 43)), "outage payloads are lost");
	wait_for(|| channel.subscriptions() == 2 && channel.is_subscribed(), "listener should resubscribe").await;

	assert!(channel.publish(legacy_payload(9, 1)));
	assert!(channel.publish(legacy_payload(7, 44)));
	assert_eq!(next_encoded(&mut b).await, "data: {\"resourceId\":9,\"record\":{\"level\":1}}\n\n");
	assert_eq!(next_encoded(&mut a).await, "data: {\"resourceId\":7,\"record\":{\"level\":44}}\n\n");
	assert_eq!(a.try_recv(), None);

	shutdown_tx.send(true).unwrap();
	timeout(WITHIN, listener.join()).await.expect("listener exits");
	timeout(WITHIN, dispatch).await.expect("dispatch loop exits").unwrap();
}

#[tokio::test]
async fn test_feed_subsystem_lifecycle() {
	let _slot = listener_slot().await;
	let (_, connections, dispatcher) = setup();
	let channel = ScriptedChannel::new();

	// The upstream refuses the first attempt: startup fails loudly.
	channel.fail_next_subscribes(1);
	let mut feed = FeedSubsystem::new(Arc::new(channel.clone()), fast_feed(), dispatcher.clone());
	assert!(feed.start().await.is_err());
	assert!(!feed.is_running());

	let mut feed = FeedSubsystem::new(Arc::new(channel.clone()), fast_feed(), dispatcher);
	feed.start().await.unwrap();
	assert!(feed.is_running());
	assert_eq!(feed.health_status(), HealthStatus::Healthy);

	let mut a = connections.open(Some("token-a"), None).unwrap();
	assert_eq!(a.recv().await, Some(Frame::Hello));

	assert!(channel.publish(json!({"resourceId": 7, "record": {"level": 5}}).to_string()));
	assert_eq!(next_encoded(&mut a).await, "data: {\"resourceId\":7,\"record\":{\"level\":5}}\n\n");

	feed.shutdown().await.unwrap();
	assert!(!feed.is_running());
	assert!(matches!(feed.health_status(), HealthStatus::Failed { .. }));

	// Subscribers outlive the feed; closing them is the server's job.
	assert_eq!(connections.active(), 1);
}
