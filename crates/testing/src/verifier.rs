// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use livewire_auth::TokenVerifier;
use livewire_type::{AuthenticationError, Identity};
use parking_lot::RwLock;

/// Verifier backed by a fixed token table.
///
/// Tokens starting with `expired` are reported as expired.
#[derive(Default)]
pub struct StaticVerifier {
	tokens: RwLock<HashMap<String, Identity>>,
}

impl StaticVerifier {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_token(self, token: impl Into<String>, identity: impl Into<Identity>) -> Self {
		self.tokens.write().insert(token.into(), identity.into());
		self
	}

	pub fn revoke(&self, token: &str) {
		self.tokens.write().remove(token);
	}
}

impl TokenVerifier for StaticVerifier {
	fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
		if token.is_empty() {
			return Err(AuthenticationError::MissingCredentials);
		}
		if token.starts_with("expired") {
			return Err(AuthenticationError::Expired);
		}
		self.tokens.read().get(token).copied().ok_or(AuthenticationError::InvalidToken)
	}
}
