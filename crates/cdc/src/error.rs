// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Change feed error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
	/// The upstream channel could not be subscribed to.
	#[error("failed to subscribe to upstream channel: {0}")]
	Connect(String),
	/// An established subscription went away.
	#[error("upstream subscription lost: {0}")]
	SubscriptionLost(String),
	/// Another listener already owns the upstream subscription.
	#[error("a change feed listener is already running in this process")]
	AlreadyRunning,
}

pub type FeedResult<T> = Result<T, FeedError>;
