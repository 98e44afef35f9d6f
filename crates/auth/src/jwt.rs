// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use livewire_type::{AuthenticationError, Identity};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::TokenVerifier;

/// Claims carried by tokens issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	pub id: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(rename = "isAdmin", default, skip_serializing_if = "Option::is_none")]
	pub is_admin: Option<bool>,
	pub exp: u64,
}

/// HS256 verifier sharing a secret with the token issuer.
pub struct JwtVerifier {
	key: DecodingKey,
	validation: Validation,
}

impl JwtVerifier {
	pub fn new(secret: impl AsRef<[u8]>) -> Self {
		Self {
			key: DecodingKey::from_secret(secret.as_ref()),
			validation: Validation::new(Algorithm::HS256),
		}
	}

	/// Clock skew tolerated on `exp`, in seconds.
	pub fn leeway(mut self, seconds: u64) -> Self {
		self.validation.leeway = seconds;
		self
	}
}

impl TokenVerifier for JwtVerifier {
	fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
		if token.is_empty() {
			return Err(AuthenticationError::MissingCredentials);
		}

		match decode::<Claims>(token, &self.key, &self.validation) {
			Ok(data) => Ok(Identity(data.claims.id)),
			Err(e) => match e.kind() {
				ErrorKind::ExpiredSignature => Err(AuthenticationError::Expired),
				kind => {
					debug!("Rejected token: {:?}", kind);
					Err(AuthenticationError::InvalidToken)
				}
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::{SystemTime, UNIX_EPOCH};

	use jsonwebtoken::{EncodingKey, Header, encode};

	use super::*;

	const SECRET: &str = "supersecreto";

	fn now() -> u64 {
		SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
	}

	fn token(secret: &str, id: i64, exp: u64) -> String {
		let claims = Claims {
			id,
			email: Some("ops@example.com".to_string()),
			is_admin: Some(false),
			exp,
		};
		encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
	}

	#[test]
	fn test_valid_token() {
		let verifier = JwtVerifier::new(SECRET);
		let identity = verifier.verify(&token(SECRET, 42, now() + 3600)).unwrap();
		assert_eq!(identity, Identity(42));
	}

	#[test]
	fn test_empty_token() {
		let verifier = JwtVerifier::new(SECRET);
		assert_eq!(verifier.verify(""), Err(AuthenticationError::MissingCredentials));
	}

	#[test]
	fn test_wrong_secret() {
		let verifier = JwtVerifier::new(SECRET);
		assert_eq!(verifier.verify(&token("other", 42, now() + 3600)), Err(AuthenticationError::InvalidToken));
	}

	#[test]
	fn test_garbage_token() {
		let verifier = JwtVerifier::new(SECRET);
		assert_eq!(verifier.verify("abc.def.ghi"), Err(AuthenticationError::InvalidToken));
	}

	#[test]
	fn test_expired_token() {
		let verifier = JwtVerifier::new(SECRET).leeway(0);
		assert_eq!(verifier.verify(&token(SECRET, 42, now() - 120)), Err(AuthenticationError::Expired));
	}
}
