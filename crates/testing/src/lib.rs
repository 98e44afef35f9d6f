// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support for livewire crates.
//!
//! In-memory stand-ins for the external collaborators (token verification,
//! ownership lookup, upstream notification channel) plus async wait helpers.

pub mod channel;
pub mod ownership;
pub mod util;
pub mod verifier;

pub use channel::ScriptedChannel;
pub use ownership::MemoryOwnership;
pub use verifier::StaticVerifier;
