// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashSet;

use async_trait::async_trait;
use livewire_type::{Identity, LookupError, ResourceId};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::OwnershipLookup;

/// Accounts share a role with the resources they may observe.
const OWNERS_OF: &str = r#"
	SELECT c.id::int8
	  FROM reservatorios r
	  JOIN clientes c ON c.role_id = r.role_id
	 WHERE r.id = $1::int8
"#;

/// Resolves owners through the role join in Postgres.
#[derive(Clone)]
pub struct PgOwnershipLookup {
	pool: PgPool,
}

impl PgOwnershipLookup {
	pub fn new(pool: PgPool) -> Self {
		Self {
			pool,
		}
	}

	/// Connect a small dedicated pool.
	pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
		let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
		Ok(Self::new(pool))
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}
}

#[async_trait]
impl OwnershipLookup for PgOwnershipLookup {
	async fn owners_of(&self, resource: ResourceId) -> Result<HashSet<Identity>, LookupError> {
		let rows: Vec<i64> = sqlx::query_scalar(OWNERS_OF)
			.bind(resource.0)
			.fetch_all(&self.pool)
			.await
			.map_err(|e| LookupError::Unavailable(e.to_string()))?;

		debug!("Resource {} has {} owners", resource, rows.len());
		Ok(rows.into_iter().map(Identity).collect())
	}
}
