// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use stormtrooper_common_core::{PermissionTier, ToolContext, ToolError};

use crate::paths::resolve_existing;
use crate::Tool;

#[derive(Debug, Deserialize)]
struct EditFileArgs {
	file_path: PathBuf,
	old_string: String,
	new_string: String,
}

/// Replaces exactly one occurrence of a string in a file.
pub struct EditFileTool;

impl EditFileTool {
	pub fn new() -> Self {
		Self
	}
}

impl Default for EditFileTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for EditFileTool {
	fn name(&self) -> &str {
		"edit_file"
	}

	fn description(&self) -> &str {
		"Replace an exact string in a file with new content. The old string must occur exactly once."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to edit"
						},
						"old_string": {
								"type": "string",
								"description": "The exact string to find and replace"
						},
						"new_string": {
								"type": "string",
								"description": "The replacement string"
						}
				},
				"required": ["file_path", "old_string", "new_string"]
		})
	}

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::RequiresApproval
	}

	fn preview(&self, args: &str) -> Option<String> {
		Some(match serde_json::from_str::<EditFileArgs>(args) {
			Ok(args) => format!(
				"Edit {}\n--- old\n{}\n+++ new\n{}",
				args.file_path.display(),
				args.old_string,
				args.new_string
			),
			Err(_) => "Edit file (invalid params)".to_string(),
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: EditFileArgs = serde_json::from_str(args)?;
		if args.old_string.is_empty() {
			return Err(ToolError::InvalidArguments("old_string is required".to_string()));
		}

		let path = resolve_existing(&args.file_path, &ctx.workspace_root)?;
		let content = tokio::fs::read_to_string(&path).await?;

		match content.matches(&args.old_string).count() {
			0 => {
				return Err(ToolError::InvalidArguments(format!(
					"old_string not found in {}",
					args.file_path.display()
				)))
			}
			1 => {}
			n => {
				return Err(ToolError::InvalidArguments(format!(
					"old_string found {n} times in {}; provide more context to make it unique",
					args.file_path.display()
				)))
			}
		}

		let updated = content.replacen(&args.old_string, &args.new_string, 1);
		tokio::fs::write(&path, updated).await?;

		tracing::debug!(path = %path.display(), "file edited");
		Ok(format!("File edited: {}", args.file_path.display()))
	}
}
