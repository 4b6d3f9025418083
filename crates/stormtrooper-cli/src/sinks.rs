// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Line-mode output: assistant text on stdout, activity markers on stderr.

use async_trait::async_trait;
use stormtrooper_bridge::{TOOL_ARGS_DISPLAY_CHARS, TOOL_RESULT_DISPLAY_CHARS};
use stormtrooper_common_core::{truncate_chars, ActivityEvent, ActivitySink, TokenSink};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::Mutex;
use tracing::warn;

/// Streams assistant text to stdout, or to any writer in tests.
pub struct StdoutTokens<W = Stdout> {
	out: Mutex<W>,
}

impl StdoutTokens {
	pub fn new() -> Self {
		Self::with_writer(tokio::io::stdout())
	}
}

impl Default for StdoutTokens {
	fn default() -> Self {
		Self::new()
	}
}

impl<W> StdoutTokens<W> {
	pub fn with_writer(out: W) -> Self {
		Self {
			out: Mutex::new(out),
		}
	}
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> TokenSink for StdoutTokens<W> {
	async fn token(&self, text: &str) {
		let mut out = self.out.lock().await;
		if let Err(e) = out.write_all(text.as_bytes()).await {
			warn!(error = %e, "failed to write to stdout");
			return;
		}
		if let Err(e) = out.flush().await {
			warn!(error = %e, "failed to flush stdout");
		}
	}
}

/// The stderr line shown for an activity event.
pub fn marker(event: &ActivityEvent) -> String {
	match event {
		ActivityEvent::ToolStarted { name, args, .. } => {
			format!("[tool] {name}({})", truncate_chars(args, TOOL_ARGS_DISPLAY_CHARS))
		}
		ActivityEvent::ToolCompleted { name, result, .. } => format!(
			"[tool:done] {name}: {}",
			truncate_chars(result, TOOL_RESULT_DISPLAY_CHARS)
		),
		ActivityEvent::ToolFailed { name, error, .. } => format!("[tool:error] {name}: {error}"),
		ActivityEvent::ToolDenied { name, .. } => format!("[tool:denied] {name}"),
		ActivityEvent::UnknownTool { name, .. } => format!("[tool:unknown] {name}"),
		ActivityEvent::SubAgentSpawned { task } => format!("[agent] Spawning sub-agent: {task}"),
		ActivityEvent::SubAgentFinished => "[agent] Sub-agent finished".to_string(),
	}
}

pub struct StderrActivity;

#[async_trait]
impl ActivitySink for StderrActivity {
	async fn record(&self, event: ActivityEvent) {
		eprintln!("\n{}", marker(&event));
	}
}
