// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use axum::{
	Router,
	http::{HeaderValue, Method},
	routing::get,
};
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};
use tracing::error;

use crate::{
	AppState,
	handlers::{handle_stream, health},
};

/// Build the router for the streaming server.
pub fn router(state: AppState) -> Router {
	let cors = cors(&state.config().front_origin);

	Router::new()
		.route("/health", get(health))
		.route("/stream", get(handle_stream))
		.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
		.with_state(state)
}

fn cors(front_origin: &str) -> CorsLayer {
	let layer = CorsLayer::new().allow_methods([Method::GET]);
	if front_origin == "*" {
		return layer.allow_origin(AllowOrigin::any());
	}
	match HeaderValue::from_str(front_origin) {
		Ok(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
		Err(e) => {
			error!("Ignoring front origin {:?}: {}; cross-origin reads are refused", front_origin, e);
			layer
		}
	}
}
