// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Error responses for the streaming endpoints.
//!
//! Every refusal happens before a stream is opened, so it can still be a
//! regular JSON response.

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use livewire_subscription::ConnectError;
use livewire_type::AuthenticationError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	/// Human-readable error message.
	pub error: String,
	/// Machine-readable error code.
	pub code: String,
}

impl ErrorResponse {
	pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			error: error.into(),
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("Authentication error: {0}")]
	Auth(#[from] AuthenticationError),

	#[error("Connection limit of {max} reached")]
	AtCapacity {
		max: usize,
	},

	#[error("Server is shutting down")]
	ShuttingDown,

	#[error("Bad request: {0}")]
	BadRequest(String),
}

impl From<ConnectError> for AppError {
	fn from(e: ConnectError) -> Self {
		match e {
			ConnectError::Authentication(e) => AppError::Auth(e),
			ConnectError::AtCapacity {
				max,
			} => AppError::AtCapacity {
				max,
			},
			ConnectError::ShuttingDown => AppError::ShuttingDown,
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			AppError::Auth(AuthenticationError::MissingCredentials) => {
				(StatusCode::UNAUTHORIZED, "AUTH_REQUIRED", "Authentication required".to_string())
			}
			AppError::Auth(AuthenticationError::InvalidToken) => {
				(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "Invalid authentication token".to_string())
			}
			AppError::Auth(AuthenticationError::Expired) => {
				(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "Authentication token expired".to_string())
			}
			AppError::AtCapacity {
				max,
			} => {
				tracing::warn!("Refusing stream, {} connections open", max);
				(StatusCode::SERVICE_UNAVAILABLE, "AT_CAPACITY", "Too many open streams".to_string())
			}
			AppError::ShuttingDown => {
				(StatusCode::SERVICE_UNAVAILABLE, "SHUTTING_DOWN", "Server is shutting down".to_string())
			}
			AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
		};

		let body = Json(ErrorResponse::new(code, message));
		(status, body).into_response()
	}
}
