// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Registry of open streaming connections.
//!
//! Shared by connection handling and the dispatcher. Readers never iterate
//! the live map while writing to subscribers; they take a [`snapshot`] first,
//! so a concurrent insert or remove can neither tear an iteration nor cause
//! another live entry to be skipped.
//!
//! [`snapshot`]: SubscriberRegistry::snapshot

use dashmap::DashMap;
use livewire_type::{Identity, SubscriberId};
use tracing::debug;

use crate::Subscriber;

pub struct SubscriberRegistry {
	/// subscriber_id → subscriber
	subscribers: DashMap<SubscriberId, Subscriber>,
}

impl SubscriberRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self {
			subscribers: DashMap::new(),
		}
	}

	/// Register a subscriber. Returns false if its id was already present.
	pub fn insert(&self, subscriber: Subscriber) -> bool {
		let id = subscriber.id();
		let fresh = self.subscribers.insert(id, subscriber).is_none();
		debug!("Registered subscriber {}", id);
		fresh
	}

	/// Remove a subscriber.
	///
	/// Returns the removed entry; removing an absent id is a no-op returning
	/// `None`.
	pub fn remove(&self, id: SubscriberId) -> Option<Subscriber> {
		let removed = self.subscribers.remove(&id).map(|(_, subscriber)| subscriber);
		if removed.is_some() {
			debug!("Removed subscriber {}", id);
		}
		removed
	}

	pub fn get(&self, id: SubscriberId) -> Option<Subscriber> {
		self.subscribers.get(&id).map(|entry| entry.value().clone())
	}

	pub fn contains(&self, id: SubscriberId) -> bool {
		self.subscribers.contains_key(&id)
	}

	/// Point-in-time copy of every registered subscriber.
	pub fn snapshot(&self) -> Vec<Subscriber> {
		self.subscribers.iter().map(|entry| entry.value().clone()).collect()
	}

	/// Number of open connections held by `identity`.
	pub fn count_for(&self, identity: Identity) -> usize {
		self.subscribers.iter().filter(|entry| entry.value().identity() == identity).count()
	}

	pub fn len(&self) -> usize {
		self.subscribers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.subscribers.is_empty()
	}
}

impl Default for SubscriberRegistry {
	fn default() -> Self {
		Self::new()
	}
}
