// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Serialises tests that start a change feed listener.
//!
//! A process holds at most one upstream claim, so tests in the same binary
//! that start a listener take turns.

use livewire_cdc::ChangeFeedListener;
use tokio::sync::{Mutex, MutexGuard};

use super::wait_for;

static LISTENER_SLOT: Mutex<()> = Mutex::const_new(());

/// Wait for exclusive use of the listener claim.
///
/// Returns once no other test holds the slot and the previous listener, if
/// any, has released its claim. Keep the guard alive for the whole test.
pub async fn listener_slot() -> MutexGuard<'static, ()> {
	let slot = LISTENER_SLOT.lock().await;
	wait_for(|| !ChangeFeedListener::is_claimed(), "previous listener should release its claim").await;
	slot
}
