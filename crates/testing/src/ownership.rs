// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{HashMap, HashSet},
	sync::atomic::{AtomicBool, AtomicUsize, Ordering},
	time::Duration,
};

use async_trait::async_trait;
use livewire_catalog::OwnershipLookup;
use livewire_type::{Identity, LookupError, ResourceId};
use parking_lot::RwLock;
use tokio::time::sleep;

/// Mutable in-memory ownership mapping.
#[derive(Default)]
pub struct MemoryOwnership {
	grants: RwLock<HashMap<ResourceId, HashSet<Identity>>>,
	unavailable: AtomicBool,
	delay: RwLock<Option<Duration>>,
	lookups: AtomicUsize,
}

impl MemoryOwnership {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn grant(&self, identity: impl Into<Identity>, resource: impl Into<ResourceId>) {
		self.grants.write().entry(resource.into()).or_default().insert(identity.into());
	}

	pub fn revoke(&self, identity: impl Into<Identity>, resource: impl Into<ResourceId>) {
		if let Some(owners) = self.grants.write().get_mut(&resource.into()) {
			owners.remove(&identity.into());
		}
	}

	/// Make every lookup fail until called again with `false`.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// Delay every lookup by `delay`.
	pub fn set_delay(&self, delay: Option<Duration>) {
		*self.delay.write() = delay;
	}

	/// Number of lookups served so far, failed ones included.
	pub fn lookups(&self) -> usize {
		self.lookups.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl OwnershipLookup for MemoryOwnership {
	async fn owners_of(&self, resource: ResourceId) -> Result<HashSet<Identity>, LookupError> {
		self.lookups.fetch_add(1, Ordering::SeqCst);

		let delay = *self.delay.read();
		if let Some(delay) = delay {
			sleep(delay).await;
		}

		if self.unavailable.load(Ordering::SeqCst) {
			return Err(LookupError::Unavailable("ownership store offline".to_string()));
		}
		Ok(self.grants.read().get(&resource).cloned().unwrap_or_default())
	}
}
