// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use stormtrooper_cli_tools::ToolRegistry;
use stormtrooper_common_core::{
	ActivitySink, AgentConfig, AgentError, AgentResult, AgentState, DiscardActivity, DiscardTokens,
	LlmClient, LlmRequest, Message, PermissionHandler, TokenSink, ToolContext,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::filter::VisibleTokenFilter;

/// Tool-result text for calls skipped because the turn was cancelled.
pub(crate) const SKIPPED_RESULT: &str = "Tool call skipped: turn cancelled";

/// Drives one conversation: sends the history to the model, dispatches the
/// tool calls it asks for, and repeats until the model answers with text
/// alone.
///
/// The history is append-only. Every assistant message that carries tool
/// calls is followed, before the next model request, by exactly one tool
/// message per call, in call order.
pub struct Agent {
	id: Uuid,
	config: AgentConfig,
	llm: Arc<dyn LlmClient>,
	tools: Arc<ToolRegistry>,
	permission: Arc<dyn PermissionHandler>,
	tokens: Arc<dyn TokenSink>,
	activity: Arc<dyn ActivitySink>,
	history: Vec<Message>,
	state: AgentState,
}

impl Agent {
	pub fn new(
		config: AgentConfig,
		llm: Arc<dyn LlmClient>,
		tools: Arc<ToolRegistry>,
		permission: Arc<dyn PermissionHandler>,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			config,
			llm,
			tools,
			permission,
			tokens: Arc::new(DiscardTokens),
			activity: Arc::new(DiscardActivity),
			history: Vec::new(),
			state: AgentState::Idle,
		}
	}

	/// Routes visible assistant text and tool lifecycle markers.
	pub fn with_sinks(mut self, tokens: Arc<dyn TokenSink>, activity: Arc<dyn ActivitySink>) -> Self {
		self.tokens = tokens;
		self.activity = activity;
		self
	}

	/// Seeds the history with a system message.
	pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.history.insert(0, Message::system(prompt));
		self
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	pub fn config(&self) -> &AgentConfig {
		&self.config
	}

	pub fn history(&self) -> &[Message] {
		&self.history
	}

	pub fn state(&self) -> AgentState {
		self.state
	}

	fn transition(&mut self, to: AgentState) {
		if self.state != to {
			info!(agent_id = %self.id, from = self.state.name(), to = to.name(), "state transition");
			self.state = to;
		}
	}

	/// Runs one user turn to completion.
	///
	/// Returns `Ok` once the model answers without tool calls. Returns
	/// [`AgentError::Cancelled`] if `cancel` fires, and the protocol error if
	/// a model request fails. Tool failures never end the turn.
	#[instrument(skip(self, cancel, text), fields(agent_id = %self.id))]
	pub async fn send(&mut self, cancel: &CancellationToken, text: &str) -> AgentResult<()> {
		self.history.push(Message::user(text));

		let result = self.run_loop(cancel).await;
		match &result {
			Ok(()) => self.transition(AgentState::TurnComplete),
			Err(e) if e.is_cancelled() => self.transition(AgentState::Cancelled),
			Err(e) => {
				warn!(error = %e, "turn failed");
				self.transition(AgentState::Failed);
			}
		}
		result
	}

	async fn run_loop(&mut self, cancel: &CancellationToken) -> AgentResult<()> {
		loop {
			if cancel.is_cancelled() {
				info!(agent_id = %self.id, "turn cancelled");
				return Err(AgentError::Cancelled);
			}

			self.transition(AgentState::AwaitingModel);

			let mut request = LlmRequest::new(self.config.model_name.clone())
				.with_messages(self.history.clone())
				.with_tools(self.tools.definitions());
			if let Some(max_tokens) = self.config.max_tokens {
				request = request.with_max_tokens(max_tokens);
			}
			if let Some(temperature) = self.config.temperature {
				request = request.with_temperature(temperature);
			}

			debug!(
				agent_id = %self.id,
				message_count = self.history.len(),
				"calling LLM"
			);

			let mut filter = VisibleTokenFilter::new(self.tokens.clone());
			let message = tokio::select! {
				biased;
				_ = cancel.cancelled() => {
					info!(agent_id = %self.id, "turn cancelled during streaming");
					return Err(AgentError::Cancelled);
				}
				result = self.llm.complete_streaming(request, &mut filter) => result?,
			};

			let tool_calls = message.tool_calls.clone();
			self.history.push(message);

			if tool_calls.is_empty() {
				info!(agent_id = %self.id, "turn complete - no tool calls");
				return Ok(());
			}

			let ctx = ToolContext::new(self.config.workspace_root.clone())
				.with_cancel(cancel.clone())
				.with_activity(self.activity.clone());

			for (done, call) in tool_calls.iter().enumerate() {
				self.transition(AgentState::Executing {
					pending: tool_calls.len() - done,
				});

				let result = if cancel.is_cancelled() {
					debug!(tool_id = %call.id, "skipping tool call after cancellation");
					SKIPPED_RESULT.to_string()
				} else {
					debug!(tool_id = %call.id, tool_name = %call.name, "executing tool");
					self.tools.dispatch(call, self.permission.as_ref(), &ctx).await
				};

				self.history.push(Message::tool(&call.id, &call.name, result));
			}
		}
	}
}
