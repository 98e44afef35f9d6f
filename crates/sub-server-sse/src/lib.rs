// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Streaming HTTP server subsystem for livewire.
//!
//! Serves authenticated `text/event-stream` connections on top of a
//! [`ConnectionManager`](livewire_subscription::ConnectionManager) and
//! implements the [`Subsystem`](livewire_sub_api::Subsystem) trait for
//! lifecycle management.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check with the current connection count
//! - `GET /stream?token=<jwt>[&resource=<id>]` - Change event stream
//!
//! # Example
//!
//! ```ignore
//! let connections = ConnectionManager::new(verifier, StreamConfig::default());
//! let state = AppState::new(connections, SseConfig::default());
//!
//! let mut sse = SseSubsystem::new(state);
//! sse.start().await?;
//! // Server is now accepting streams
//!
//! sse.shutdown().await?;
//! // Every stream is closed and the listener is gone
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod subsystem;

pub use config::SseConfig;
pub use error::{AppError, ErrorResponse};
pub use handlers::{HealthResponse, StreamParams};
pub use routes::router;
pub use state::AppState;
pub use subsystem::SseSubsystem;
