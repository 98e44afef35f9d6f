// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Who may observe a resource, right now.
//!
//! Ownership can change at any time through the administrative surface, so
//! results are only reused for a short window. Failures are never cached; the
//! next dispatch for the same resource asks again.

use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;
use livewire_catalog::OwnershipLookup;
use livewire_type::{Identity, LookupError, ResourceId};
use parking_lot::Mutex;
use tokio::time::{Instant, timeout};
use tracing::{debug, instrument};

use crate::ResolverConfig;

pub type Owners = Arc<HashSet<Identity>>;

struct CachedOwners {
	owners: Owners,
	resolved_at: Instant,
}

pub struct AuthorizationResolver {
	lookup: Arc<dyn OwnershipLookup>,
	config: ResolverConfig,
	cache: DashMap<ResourceId, CachedOwners>,
	last_sweep: Mutex<Instant>,
}

impl AuthorizationResolver {
	pub fn new(lookup: Arc<dyn OwnershipLookup>, config: ResolverConfig) -> Self {
		Self {
			lookup,
			config,
			cache: DashMap::new(),
			last_sweep: Mutex::new(Instant::now()),
		}
	}

	pub fn config(&self) -> &ResolverConfig {
		&self.config
	}

	/// Identities allowed to observe `resource`. Unknown resources resolve to
	/// an empty set.
	#[instrument(name = "resolver::resolve", level = "trace", skip(self))]
	pub async fn resolve(&self, resource: ResourceId) -> Result<Owners, LookupError> {
		if let Some(owners) = self.cached(resource) {
			return Ok(owners);
		}

		let limit = self.config.lookup_timeout;
		let owners: Owners = timeout(limit, self.lookup.owners_of(resource))
			.await
			.map_err(|_| LookupError::Timeout(limit))??
			.into();

		if !self.config.cache_ttl.is_zero() {
			let now = Instant::now();
			self.sweep_expired(now);
			self.cache.insert(
				resource,
				CachedOwners {
					owners: owners.clone(),
					resolved_at: now,
				},
			);
		}
		debug!("Resolved {} owner(s) for resource {}", owners.len(), resource);
		Ok(owners)
	}

	/// Forget the cached owners of one resource.
	pub fn invalidate(&self, resource: ResourceId) {
		self.cache.remove(&resource);
	}

	/// Forget every cached owner set.
	pub fn clear(&self) {
		self.cache.clear();
	}

	/// Number of cached owner sets, expired ones included until swept.
	pub fn cached_len(&self) -> usize {
		self.cache.len()
	}

	/// Drop expired entries, at most once per cache window.
	fn sweep_expired(&self, now: Instant) {
		let ttl = self.config.cache_ttl;
		{
			let mut last = self.last_sweep.lock();
			if now.duration_since(*last) < ttl {
				return;
			}
			*last = now;
		}
		self.cache.retain(|_, cached| now.duration_since(cached.resolved_at) < ttl);
	}

	fn cached(&self, resource: ResourceId) -> Option<Owners> {
		let ttl = self.config.cache_ttl;
		if ttl.is_zero() {
			return None;
		}

		let entry = self.cache.get(&resource)?;
		if entry.resolved_at.elapsed() < ttl {
			return Some(entry.owners.clone());
		}
		drop(entry);

		self.cache.remove_if(&resource, |_, cached| cached.resolved_at.elapsed() >= ttl);
		None
	}
}
