// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! LLM abstraction types for request/response handling and streaming.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::message::Message;
use crate::tool::ToolDefinition;

/// Request to send to an LLM for completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmRequest {
	pub model: String,
	pub messages: Vec<Message>,
	pub tools: Vec<ToolDefinition>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
}

impl LlmRequest {
	pub fn new(model: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			messages: Vec::new(),
			tools: Vec::new(),
			max_tokens: None,
			temperature: None,
		}
	}

	pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
		self.messages = messages;
		self
	}

	pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
		self.tools = tools;
		self
	}

	pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
		self.max_tokens = Some(max_tokens);
		self
	}

	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = Some(temperature);
		self
	}
}

/// Response from a non-streaming completion request.
#[derive(Clone, Debug)]
pub struct LlmResponse {
	pub message: Message,
	pub finish_reason: Option<String>,
}

/// One incremental fragment of a streamed assistant message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamDelta {
	pub role: Option<String>,
	pub content: Option<String>,
	pub tool_calls: Vec<ToolCallFragment>,
}

impl StreamDelta {
	/// A delta that only carries assistant text.
	pub fn text(content: impl Into<String>) -> Self {
		Self {
			content: Some(content.into()),
			..Default::default()
		}
	}

	pub fn has_tool_calls(&self) -> bool {
		!self.tool_calls.is_empty()
	}
}

/// Partial tool-call data keyed by its position in the final call list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolCallFragment {
	pub index: usize,
	pub id: Option<String>,
	pub call_type: Option<String>,
	pub name: Option<String>,
	pub arguments: Option<String>,
}

/// Model-specific control tokens that must never reach the user.
pub const SENTINEL_TOKENS: &[&str] = &[
	"<|tool_call_end|>",
	"<|tool_call_start|>",
	"<|function|>",
	"<|tool_sep|>",
	"<|im_end|>",
];

/// Removes every [`SENTINEL_TOKENS`] occurrence from `text`.
pub fn strip_sentinel_tokens(text: &str) -> String {
	let mut out = text.to_string();
	for token in SENTINEL_TOKENS {
		if out.contains(token) {
			out = out.replace(token, "");
		}
	}
	out
}

/// Observer invoked for every delta before it is folded into the accumulated
/// message.
#[async_trait]
pub trait DeltaHandler: Send {
	async fn on_delta(&mut self, delta: &StreamDelta);
}

/// Trait for LLM client implementations.
#[async_trait]
pub trait LlmClient: Send + Sync {
	/// Sends a completion request and waits for the full response.
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

	/// Streams a completion, handing each delta to `on_delta` as it arrives,
	/// and returns the reassembled assistant message once the stream ends.
	async fn complete_streaming(
		&self,
		request: LlmRequest,
		on_delta: &mut dyn DeltaHandler,
	) -> Result<Message, LlmError>;
}
