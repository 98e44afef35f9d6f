// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ResourceId, error::PayloadError};

/// A change to one resource, as announced by the upstream feed.
///
/// Immutable once constructed. Serializes to the wire shape subscribers see:
///
/// ```json
/// {"resourceId":7,"record":{"level":42}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
	resource_id: ResourceId,
	record: Value,
	#[serde(skip)]
	produced_at: SystemTime,
}

/// Upstream notification body.
///
/// The feed trigger historically emitted `reservatorio_id` / `registro`; both
/// spellings are accepted.
#[derive(Debug, Deserialize)]
struct Payload {
	#[serde(rename = "resourceId", alias = "reservatorio_id")]
	resource_id: ResourceId,
	#[serde(alias = "registro")]
	record: Value,
}

impl ChangeEvent {
	pub fn new(resource_id: ResourceId, record: Value, produced_at: SystemTime) -> Result<Self, PayloadError> {
		if !record.is_object() {
			return Err(PayloadError::RecordNotObject);
		}
		Ok(Self {
			resource_id,
			record,
			produced_at,
		})
	}

	/// Parse a raw upstream notification payload.
	pub fn parse(payload: &str, produced_at: SystemTime) -> Result<Self, PayloadError> {
		let Payload {
			resource_id,
			record,
		} = serde_json::from_str(payload)?;
		Self::new(resource_id, record, produced_at)
	}

	pub fn resource_id(&self) -> ResourceId {
		self.resource_id
	}

	pub fn record(&self) -> &Value {
		&self.record
	}

	pub fn produced_at(&self) -> SystemTime {
		self.produced_at
	}

	/// Compact JSON as written on subscriber streams.
	pub fn to_json(&self) -> String {
		// A struct of a newtype integer and a JSON value cannot fail to serialize.
		serde_json::to_string(self).unwrap_or_default()
	}
}
