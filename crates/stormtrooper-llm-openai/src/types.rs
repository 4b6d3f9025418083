// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAI-specific API types and conversions.

use serde::{Deserialize, Serialize};
use stormtrooper_common_core::{
	LlmRequest, Message, Role, StreamDelta, ToolCall, ToolCallFragment, ToolDefinition,
};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for the OpenAI-compatible client.
#[derive(Clone)]
pub struct OpenAIConfig {
	pub api_key: String,
	pub base_url: String,
}

impl OpenAIConfig {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			base_url: DEFAULT_BASE_URL.to_string(),
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	/// Full URL of the chat-completions endpoint.
	pub fn completions_url(&self) -> String {
		format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
	}
}

impl std::fmt::Debug for OpenAIConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OpenAIConfig")
			.field("api_key", &"[REDACTED]")
			.field("base_url", &self.base_url)
			.finish()
	}
}

/// OpenAI chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
	pub model: String,
	pub messages: Vec<OpenAIMessage>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub tools: Vec<OpenAITool>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub stream: bool,
}

impl OpenAIRequest {
	pub fn from_llm(request: &LlmRequest, stream: bool) -> Self {
		Self {
			model: request.model.clone(),
			messages: request.messages.iter().map(OpenAIMessage::from).collect(),
			max_tokens: request.max_tokens,
			temperature: request.temperature,
			tools: request.tools.iter().map(OpenAITool::from).collect(),
			stream,
		}
	}
}

/// OpenAI message format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
	pub role: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

/// OpenAI tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolCall {
	pub id: String,
	#[serde(rename = "type", default = "function_type")]
	pub call_type: String,
	pub function: OpenAIFunctionCall,
}

fn function_type() -> String {
	"function".to_string()
}

/// OpenAI function call details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionCall {
	pub name: String,
	#[serde(default)]
	pub arguments: String,
}

/// OpenAI tool definition.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAITool {
	#[serde(rename = "type")]
	pub tool_type: String,
	pub function: OpenAIFunction,
}

/// OpenAI function definition.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIFunction {
	pub name: String,
	pub description: String,
	pub parameters: serde_json::Value,
}

/// OpenAI chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub model: String,
	pub choices: Vec<OpenAIChoice>,
}

/// OpenAI response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
	#[serde(default)]
	pub index: u32,
	pub message: OpenAIMessage,
	#[serde(default)]
	pub finish_reason: Option<String>,
}

/// OpenAI streaming chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChunk {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub choices: Vec<OpenAIStreamChoice>,
}

/// OpenAI streaming choice.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIStreamChoice {
	#[serde(default)]
	pub index: u32,
	#[serde(default)]
	pub delta: OpenAIDelta,
	#[serde(default)]
	pub finish_reason: Option<String>,
}

/// OpenAI streaming delta.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OpenAIDelta {
	#[serde(default)]
	pub role: Option<String>,
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default)]
	pub tool_calls: Option<Vec<OpenAIToolCallDelta>>,
}

/// OpenAI streaming tool call delta.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIToolCallDelta {
	pub index: usize,
	#[serde(default)]
	pub id: Option<String>,
	#[serde(rename = "type", default)]
	pub call_type: Option<String>,
	#[serde(default)]
	pub function: Option<OpenAIFunctionDelta>,
}

/// OpenAI streaming function delta.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OpenAIFunctionDelta {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub arguments: Option<String>,
}

impl From<&Message> for OpenAIMessage {
	fn from(msg: &Message) -> Self {
		let tool_calls = if msg.tool_calls.is_empty() {
			None
		} else {
			Some(msg.tool_calls.iter().map(OpenAIToolCall::from).collect())
		};

		Self {
			role: msg.role.as_str().to_string(),
			content: if msg.content.is_empty() && tool_calls.is_some() {
				None
			} else {
				Some(msg.content.clone())
			},
			name: msg.name.clone(),
			tool_call_id: msg.tool_call_id.clone(),
			tool_calls,
		}
	}
}

impl From<&ToolCall> for OpenAIToolCall {
	fn from(call: &ToolCall) -> Self {
		Self {
			id: call.id.clone(),
			call_type: call.call_type.clone(),
			function: OpenAIFunctionCall {
				name: call.name.clone(),
				arguments: call.arguments.clone(),
			},
		}
	}
}

impl From<&ToolDefinition> for OpenAITool {
	fn from(def: &ToolDefinition) -> Self {
		Self {
			tool_type: function_type(),
			function: OpenAIFunction {
				name: def.name.clone(),
				description: def.description.clone(),
				parameters: def.input_schema.clone(),
			},
		}
	}
}

impl From<OpenAIMessage> for Message {
	fn from(msg: OpenAIMessage) -> Self {
		Self {
			role: Role::parse(&msg.role).unwrap_or(Role::Assistant),
			content: msg.content.unwrap_or_default(),
			tool_call_id: msg.tool_call_id,
			name: msg.name,
			tool_calls: msg
				.tool_calls
				.unwrap_or_default()
				.into_iter()
				.map(|tc| ToolCall {
					id: tc.id,
					call_type: tc.call_type,
					name: tc.function.name,
					arguments: tc.function.arguments,
				})
				.collect(),
		}
	}
}

impl From<OpenAIDelta> for StreamDelta {
	fn from(delta: OpenAIDelta) -> Self {
		Self {
			role: delta.role.filter(|r| !r.is_empty()),
			content: delta.content,
			tool_calls: delta
				.tool_calls
				.unwrap_or_default()
				.into_iter()
				.map(|tc| {
					let function = tc.function.unwrap_or_default();
					ToolCallFragment {
						index: tc.index,
						id: tc.id,
						call_type: tc.call_type,
						name: function.name,
						arguments: function.arguments,
					}
				})
				.collect(),
		}
	}
}
