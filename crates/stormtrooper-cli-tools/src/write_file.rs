// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use stormtrooper_common_core::{PermissionTier, ToolContext, ToolError};

use crate::paths::resolve_within;
use crate::Tool;

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
	file_path: PathBuf,
	content: String,
}

pub struct WriteFileTool;

impl WriteFileTool {
	pub fn new() -> Self {
		Self
	}
}

impl Default for WriteFileTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for WriteFileTool {
	fn name(&self) -> &str {
		"write_file"
	}

	fn description(&self) -> &str {
		"Create or overwrite a file with the given content"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to write"
						},
						"content": {
								"type": "string",
								"description": "The content to write to the file"
						}
				},
				"required": ["file_path", "content"]
		})
	}

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::RequiresApproval
	}

	fn preview(&self, args: &str) -> Option<String> {
		let Ok(args) = serde_json::from_str::<WriteFileArgs>(args) else {
			return Some("Write file (invalid params)".to_string());
		};
		let mut preview = format!(
			"Write {} bytes to {}",
			args.content.len(),
			args.file_path.display()
		);
		if args.file_path.exists() {
			preview.push_str(" (overwrite existing file)");
		}
		Some(preview)
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: WriteFileArgs = serde_json::from_str(args)?;
		let path = resolve_within(&args.file_path, &ctx.workspace_root)?;

		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::write(&path, args.content.as_bytes()).await?;

		tracing::debug!(path = %path.display(), bytes = args.content.len(), "file written");
		Ok(format!("File written: {}", args.file_path.display()))
	}
}
