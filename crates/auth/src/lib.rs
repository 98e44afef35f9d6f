// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Bearer credential verification.
//!
//! Credentials are issued elsewhere; this crate only answers "which identity
//! does this token belong to". [`TokenVerifier`] is the seam the connection
//! manager depends on, and [`JwtVerifier`] is the HS256 implementation used
//! in production.

mod jwt;

pub use jwt::{Claims, JwtVerifier};
use livewire_type::{AuthenticationError, Identity};

/// Verifies a bearer credential and returns the identity it was issued to.
pub trait TokenVerifier: Send + Sync {
	fn verify(&self, token: &str) -> Result<Identity, AuthenticationError>;
}

impl<T: TokenVerifier + ?Sized> TokenVerifier for std::sync::Arc<T> {
	fn verify(&self, token: &str) -> Result<Identity, AuthenticationError> {
		(**self).verify(token)
	}
}
