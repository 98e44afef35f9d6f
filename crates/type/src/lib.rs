// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Shared value types for the livewire fan-out pipeline.
//!
//! Everything here is plain data: identifiers, the immutable [`ChangeEvent`]
//! carried from the upstream feed to subscribers, and the error taxonomy the
//! other crates report through.

pub mod error;
pub mod event;
pub mod id;

pub use error::{AuthenticationError, ConnectionWriteError, LookupError, PayloadError};
pub use event::ChangeEvent;
pub use id::{Identity, ResourceId, SubscriberId};
