// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wait utilities for testing
//!
//! Poll a condition or a channel with a deadline instead of sleeping for a
//! fixed amount of time.

use std::time::Duration;

use tokio::{
	sync::mpsc,
	time::{Instant, sleep, timeout},
};

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval (1 millisecond)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Wait for a condition to become true, polling at regular intervals
///
/// # Panics
/// Panics if the condition doesn't become true within `timeout`
pub async fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, timeout_message: &str)
where
	F: Fn() -> bool,
{
	let deadline = Instant::now() + timeout;
	while !condition() {
		if Instant::now() > deadline {
			panic!("Timeout after {:?}: {}", timeout, timeout_message);
		}
		sleep(poll_interval).await;
	}
}

/// Wait for a condition with default timeout and poll interval
pub async fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message).await;
}

/// Receive the next message, or `None` if nothing arrives within `within`
/// or the channel is closed.
pub async fn recv_within<T>(rx: &mut mpsc::Receiver<T>, within: Duration) -> Option<T> {
	timeout(within, rx.recv()).await.ok().flatten()
}
