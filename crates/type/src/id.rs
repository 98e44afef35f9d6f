// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The account a verified bearer credential belongs to.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub i64);

impl Display for Identity {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl Deref for Identity {
	type Target = i64;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<i64> for Identity {
	fn from(value: i64) -> Self {
		Identity(value)
	}
}

/// The resource a change event is about.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub i64);

impl Display for ResourceId {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl Deref for ResourceId {
	type Target = i64;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<i64> for ResourceId {
	fn from(value: i64) -> Self {
		ResourceId(value)
	}
}

impl PartialEq<i64> for ResourceId {
	fn eq(&self, other: &i64) -> bool {
		self.0.eq(other)
	}
}

/// Unique identifier of one open streaming connection.
///
/// Time-ordered, so sorting a registry snapshot by id yields connection
/// order.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
	pub fn generate() -> Self {
		SubscriberId(Uuid::now_v7())
	}
}

impl Display for SubscriberId {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_identity_serializes_as_number() {
		assert_eq!(serde_json::to_string(&Identity(12)).unwrap(), "12");
		let id: Identity = serde_json::from_str("12").unwrap();
		assert_eq!(id, Identity(12));
	}

	#[test]
	fn test_subscriber_ids_are_unique() {
		let a = SubscriberId::generate();
		let b = SubscriberId::generate();
		assert_ne!(a, b);
	}
}
