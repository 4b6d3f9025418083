// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::activity::{ActivitySink, DiscardActivity};

/// Definition of a tool as advertised to the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
	pub name: String,
	pub description: String,
	pub input_schema: serde_json::Value,
}

impl ToolDefinition {
	pub fn new(
		name: impl Into<String>,
		description: impl Into<String>,
		input_schema: serde_json::Value,
	) -> Self {
		let name = name.into();
		tracing::debug!(
				tool_name = %name,
				"Creating tool definition"
		);
		Self {
			name,
			description: description.into(),
			input_schema,
		}
	}
}

/// Whether a tool may run without a human decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionTier {
	Auto,
	RequiresApproval,
}

/// Context provided to tools during execution.
///
/// Cloned into every dispatch. The cancellation token is shared by the whole
/// turn, including nested sub-agents.
#[derive(Clone)]
pub struct ToolContext {
	pub workspace_root: PathBuf,
	pub cancel: CancellationToken,
	pub activity: Arc<dyn ActivitySink>,
}

impl ToolContext {
	pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
		let workspace_root = workspace_root.into();
		tracing::debug!(
				workspace_root = %workspace_root.display(),
				"Creating tool context"
		);
		Self {
			workspace_root,
			cancel: CancellationToken::new(),
			activity: Arc::new(DiscardActivity),
		}
	}

	pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
		self.cancel = cancel;
		self
	}

	pub fn with_activity(mut self, activity: Arc<dyn ActivitySink>) -> Self {
		self.activity = activity;
		self
	}
}

impl fmt::Debug for ToolContext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ToolContext")
			.field("workspace_root", &self.workspace_root)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish_non_exhaustive()
	}
}
