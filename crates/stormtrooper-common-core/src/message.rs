// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// Role of a message participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	#[default]
	Assistant,
	Tool,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::System => "system",
			Role::User => "user",
			Role::Assistant => "assistant",
			Role::Tool => "tool",
		}
	}

	/// Parses a wire role. Unrecognised roles yield `None`.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"system" => Some(Role::System),
			"user" => Some(Role::User),
			"assistant" => Some(Role::Assistant),
			"tool" => Some(Role::Tool),
			_ => None,
		}
	}
}

/// A message in a conversation.
///
/// Messages are immutable once appended to a history.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tool_calls: Vec<ToolCall>,
}

impl Message {
	pub fn system(content: impl Into<String>) -> Self {
		Self {
			role: Role::System,
			content: content.into(),
			..Default::default()
		}
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self {
			role: Role::User,
			content: content.into(),
			..Default::default()
		}
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self {
			role: Role::Assistant,
			content: content.into(),
			..Default::default()
		}
	}

	pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
		Self {
			role: Role::Assistant,
			content: content.into(),
			tool_calls,
			..Default::default()
		}
	}

	/// A tool-result message linked to the call that produced it.
	pub fn tool(
		tool_call_id: impl Into<String>,
		name: impl Into<String>,
		content: impl Into<String>,
	) -> Self {
		Self {
			role: Role::Tool,
			content: content.into(),
			tool_call_id: Some(tool_call_id.into()),
			name: Some(name.into()),
			tool_calls: Vec::new(),
		}
	}

	pub fn has_tool_calls(&self) -> bool {
		!self.tool_calls.is_empty()
	}
}

/// A tool call requested by the model.
///
/// `arguments` is the raw argument payload exactly as streamed, which may not
/// be valid JSON; tools decide how to interpret it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
	pub id: String,
	#[serde(rename = "type", default = "default_call_type")]
	pub call_type: String,
	pub name: String,
	pub arguments: String,
}

fn default_call_type() -> String {
	"function".to_string()
}

impl ToolCall {
	pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			call_type: default_call_type(),
			name: name.into(),
			arguments: arguments.into(),
		}
	}
}
