// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Units written to a subscriber's `text/event-stream`.

use std::{
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};

use livewire_type::ChangeEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
	/// Sent once, first, after a connection is accepted.
	Hello,
	/// A change event, pre-serialized once per dispatch and shared by every
	/// recipient.
	Event(Arc<str>),
	/// Keep-alive comment carrying the send time in unix milliseconds.
	Ping(u64),
}

impl Frame {
	pub fn event(event: &ChangeEvent) -> Self {
		Frame::Event(event.to_json().into())
	}

	pub fn ping_now() -> Self {
		let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0);
		Frame::Ping(millis)
	}

	pub fn encode(&self) -> String {
		match self {
			Frame::Hello => "event: hello\ndata: \"ok\"\n\n".to_string(),
			Frame::Event(json) => format!("data: {}\n\n", json),
			Frame::Ping(millis) => format!(": ping {}\n\n", millis),
		}
	}
}
