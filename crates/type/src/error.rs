// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Error taxonomy shared by the fan-out pipeline.
//!
//! None of these are fatal to the process. Authentication errors refuse a
//! connection before anything is registered, lookup errors drop a single
//! dispatch, and write errors evict a single subscriber.

use thiserror::Error;

/// A bearer credential was missing, malformed, or expired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticationError {
	#[error("missing credentials")]
	MissingCredentials,
	#[error("invalid token")]
	InvalidToken,
	#[error("token expired")]
	Expired,
}

/// The ownership mapping could not be consulted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
	#[error("ownership lookup unavailable: {0}")]
	Unavailable(String),
	#[error("ownership lookup timed out after {0:?}")]
	Timeout(std::time::Duration),
}

/// A frame could not be queued on a subscriber's outbound stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionWriteError {
	/// The peer is gone; the receiving half of the stream was dropped.
	#[error("connection closed")]
	Closed,
	/// The peer is not draining its stream fast enough.
	#[error("outbound queue full")]
	Overflow,
}

/// An upstream notification payload could not be turned into an event.
#[derive(Debug, Error)]
pub enum PayloadError {
	#[error("malformed payload: {0}")]
	Json(#[from] serde_json::Error),
	#[error("record must be a JSON object")]
	RecordNotObject,
}
