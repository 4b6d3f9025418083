// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Top-level error type for a conversation turn.
///
/// Tool failures never appear here: they are folded into the conversation as
/// tool-result text. Only transport, decode and cancellation failures end a
/// turn.
#[derive(Error, Debug)]
pub enum AgentError {
	#[error("LLM error: {0}")]
	Llm(#[from] LlmError),

	#[error("agent cancelled")]
	Cancelled,

	#[error("Invalid state: {0}")]
	InvalidState(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

impl AgentError {
	/// True when the turn ended because its cancellation token fired.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, AgentError::Cancelled | AgentError::Llm(LlmError::Cancelled))
	}
}

/// Errors that can occur during LLM interactions.
#[derive(Clone, Error, Debug)]
pub enum LlmError {
	#[error("HTTP error: {0}")]
	Http(String),

	#[error("API error (status {status}): {body}")]
	Api { status: u16, body: String },

	#[error("failed to parse SSE chunk: {0}")]
	Stream(String),

	#[error("Invalid response: {0}")]
	InvalidResponse(String),

	#[error("request cancelled")]
	Cancelled,
}

/// Errors that can occur during tool execution.
#[derive(Clone, Error, Debug)]
pub enum ToolError {
	#[error("Tool not found: {0}")]
	NotFound(String),

	#[error("Invalid arguments: {0}")]
	InvalidArguments(String),

	#[error("IO error: {0}")]
	Io(String),

	#[error("Tool execution timed out")]
	Timeout,

	#[error("Internal error: {0}")]
	Internal(String),

	#[error("Path outside workspace: {0}")]
	PathOutsideWorkspace(std::path::PathBuf),

	#[error("File not found: {0}")]
	FileNotFound(std::path::PathBuf),

	#[error("Serialization error: {0}")]
	Serialization(String),

	#[error("tool already registered: {0}")]
	DuplicateRegistration(String),
}

impl From<std::io::Error> for ToolError {
	fn from(err: std::io::Error) -> Self {
		ToolError::Io(err.to_string())
	}
}

impl From<serde_json::Error> for ToolError {
	fn from(err: serde_json::Error) -> Self {
		ToolError::InvalidArguments(err.to_string())
	}
}
