// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use tokio::sync::oneshot;
use tracing::debug;

/// Characters of tool arguments carried by [`BridgeEvent::ToolStarted`].
pub const TOOL_ARGS_DISPLAY_CHARS: usize = 80;

/// Characters of a tool result carried by [`BridgeEvent::ToolFinished`].
pub const TOOL_RESULT_DISPLAY_CHARS: usize = 200;

/// One unit of turn output, consumed exactly once by the front end.
#[derive(Debug)]
pub enum BridgeEvent {
	TurnStarted,
	Token(String),
	ToolStarted {
		id: String,
		name: String,
		args: String,
	},
	ToolFinished {
		id: String,
		name: String,
		outcome: ToolOutcome,
	},
	PermissionRequested(PermissionRequest),
	SubAgentSpawned {
		task: String,
	},
	SubAgentFinished,
	TurnFinished {
		error: Option<String>,
	},
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolOutcome {
	Completed(String),
	Failed(String),
	Denied,
	Unknown,
}

/// An approval request waiting on a human decision.
#[derive(Debug)]
pub struct PermissionRequest {
	pub id: String,
	pub tool_name: String,
	pub preview: String,
	pub responder: PermissionResponder,
}

/// Answers one permission request. Dropping it unanswered denies.
#[derive(Debug)]
pub struct PermissionResponder {
	ack: oneshot::Sender<bool>,
}

impl PermissionResponder {
	pub(crate) fn new(ack: oneshot::Sender<bool>) -> Self {
		Self { ack }
	}

	pub fn respond(self, allowed: bool) {
		if self.ack.send(allowed).is_err() {
			debug!(allowed, "permission requester no longer waiting");
		}
	}

	pub fn allow(self) {
		self.respond(true);
	}

	pub fn deny(self) {
		self.respond(false);
	}
}
