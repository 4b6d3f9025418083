// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Side channels an orchestrator writes to while a turn runs.
//!
//! Visible assistant text goes to a [`TokenSink`]; tool and sub-agent
//! lifecycle markers go to an [`ActivitySink`]. Front ends render both
//! without parsing tool-result text.

use async_trait::async_trait;

/// Lifecycle marker for tool dispatch and sub-agent delegation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivityEvent {
	ToolStarted {
		id: String,
		name: String,
		args: String,
	},
	ToolDenied {
		id: String,
		name: String,
	},
	ToolFailed {
		id: String,
		name: String,
		error: String,
	},
	ToolCompleted {
		id: String,
		name: String,
		result: String,
	},
	UnknownTool {
		id: String,
		name: String,
	},
	SubAgentSpawned {
		task: String,
	},
	SubAgentFinished,
}

#[async_trait]
pub trait ActivitySink: Send + Sync {
	async fn record(&self, event: ActivityEvent);
}

/// Receives the filtered, displayable assistant text of a turn.
#[async_trait]
pub trait TokenSink: Send + Sync {
	async fn token(&self, text: &str);
}

/// Activity sink that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardActivity;

#[async_trait]
impl ActivitySink for DiscardActivity {
	async fn record(&self, event: ActivityEvent) {
		tracing::trace!(?event, "discarding activity");
	}
}

/// Token sink that drops all text.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardTokens;

#[async_trait]
impl TokenSink for DiscardTokens {
	async fn token(&self, _text: &str) {}
}
