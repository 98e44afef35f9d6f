// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Ownership catalog: who may observe which resource.
//!
//! The mapping itself is maintained by the administrative surface and lives
//! in the backing store. This crate only reads it.

mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use livewire_type::{Identity, LookupError, ResourceId};
pub use postgres::PgOwnershipLookup;

/// Point-in-time view of the ownership mapping.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
	/// Identities currently allowed to observe `resource`.
	///
	/// An unknown resource, or one nobody may see, yields an empty set.
	async fn owners_of(&self, resource: ResourceId) -> Result<HashSet<Identity>, LookupError>;
}
