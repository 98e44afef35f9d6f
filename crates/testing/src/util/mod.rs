// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod listener;
pub mod wait;

pub use listener::listener_slot;
pub use wait::{recv_within, wait_for, wait_for_condition};
