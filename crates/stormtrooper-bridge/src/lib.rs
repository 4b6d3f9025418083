// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Connects a long-running turn to an interactive front end.
//!
//! A turn runs in its own task and writes [`BridgeEvent`]s onto one bounded,
//! ordered channel. The front end owns the only [`EventReceiver`] and waits
//! on it from a single loop. Approval requests travel over the same channel
//! and carry a one-shot [`PermissionResponder`] the front end answers once.

mod bridge;
mod chat;
mod error;
mod event;

pub use bridge::{Bridge, BridgePermission, BridgeSink, EventReceiver, DEFAULT_EVENT_CAPACITY};
pub use chat::{ChatState, Display, InputAction, TranscriptLine};
pub use error::BridgeError;
pub use event::{
	BridgeEvent, PermissionRequest, PermissionResponder, ToolOutcome, TOOL_ARGS_DISPLAY_CHARS,
	TOOL_RESULT_DISPLAY_CHARS,
};
