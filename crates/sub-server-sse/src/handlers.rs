// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Request handlers for:
//! - `/health` - Health check endpoint
//! - `/stream` - Authenticated change event stream

use std::convert::Infallible;

use axum::{
	Json,
	body::Body,
	extract::{Query, State, rejection::QueryRejection},
	http::{
		HeaderName, HeaderValue, StatusCode,
		header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
	},
	response::{IntoResponse, Response},
};
use futures_util::StreamExt;
use livewire_type::ResourceId;
use serde::{Deserialize, Serialize};

use crate::{AppState, error::AppError};

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// Query string of `/stream`.
#[derive(Debug, Deserialize)]
pub struct StreamParams {
	/// Bearer token; browsers cannot set headers on an `EventSource`.
	pub token: Option<String>,
	/// Only stream events about this resource.
	pub resource: Option<i64>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub connections: usize,
}

/// Health check endpoint.
///
/// This endpoint does not require authentication.
///
/// # Response
///
/// ```json
/// {"status": "ok", "connections": 3}
/// ```
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
	(
		StatusCode::OK,
		Json(HealthResponse {
			status: "ok",
			connections: state.connections().active(),
		}),
	)
}

/// Open a change event stream.
///
/// Credentials are checked before anything is registered; a refusal is a
/// plain JSON error. Once accepted the response never terminates on its own:
/// it ends when the client goes away or the server shuts down.
pub async fn handle_stream(
	State(state): State<AppState>,
	params: Result<Query<StreamParams>, QueryRejection>,
) -> Result<Response, AppError> {
	let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;

	let stream = state.connections().open(params.token.as_deref(), params.resource.map(ResourceId))?;
	let body = Body::from_stream(stream.map(|frame| Ok::<_, Infallible>(frame.encode())));

	Ok((
		[
			(CONTENT_TYPE, HeaderValue::from_static("text/event-stream; charset=utf-8")),
			(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-transform")),
			(CONNECTION, HeaderValue::from_static("keep-alive")),
			(X_ACCEL_BUFFERING, HeaderValue::from_static("no")),
		],
		body,
	)
		.into_response())
}
