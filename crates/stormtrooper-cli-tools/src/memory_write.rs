// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stormtrooper_common_core::{PermissionTier, ToolContext, ToolError};

use crate::paths::resolve_within;
use crate::Tool;

/// Directory, relative to the workspace root, holding persistent notes.
pub const MEMORY_DIR: &str = ".stormtrooper/memory";

#[derive(Debug, Deserialize)]
struct MemoryWriteArgs {
	file_path: PathBuf,
	content: String,
}

/// Writes plain-text notes that are loaded into future sessions.
pub struct MemoryWriteTool;

impl MemoryWriteTool {
	pub fn new() -> Self {
		Self
	}
}

impl Default for MemoryWriteTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for MemoryWriteTool {
	fn name(&self) -> &str {
		"memory_write"
	}

	fn description(&self) -> &str {
		"Write content to a memory file for persistent storage across sessions"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path relative to .stormtrooper/memory/ (e.g., 'MEMORY.md' or 'notes/debug.md')"
						},
						"content": {
								"type": "string",
								"description": "Content to write to the memory file"
						}
				},
				"required": ["file_path", "content"]
		})
	}

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::RequiresApproval
	}

	fn preview(&self, args: &str) -> Option<String> {
		Some(match serde_json::from_str::<MemoryWriteArgs>(args) {
			Ok(args) => format!(
				"Write {} bytes to memory: {}",
				args.content.len(),
				Path::new(MEMORY_DIR).join(&args.file_path).display()
			),
			Err(_) => "Write memory file (invalid params)".to_string(),
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: MemoryWriteArgs = serde_json::from_str(args)?;
		if args.file_path.as_os_str().is_empty() {
			return Err(ToolError::InvalidArguments("file_path is required".to_string()));
		}
		if args.file_path.is_absolute() {
			return Err(ToolError::InvalidArguments(
				"file_path must be relative to the memory directory".to_string(),
			));
		}

		let memory_root = ctx.workspace_root.join(MEMORY_DIR);
		tokio::fs::create_dir_all(&memory_root).await?;

		let path = resolve_within(&args.file_path, &memory_root).map_err(|e| match e {
			ToolError::PathOutsideWorkspace(_) => ToolError::InvalidArguments(
				"file_path must not escape the memory directory".to_string(),
			),
			other => other,
		})?;

		if let Some(parent) = path.parent() {
			tokio::fs::create_dir_all(parent).await?;
		}
		tokio::fs::write(&path, args.content.as_bytes()).await?;

		tracing::info!(path = %path.display(), bytes = args.content.len(), "memory written");
		Ok(format!("Memory written: {}", path.display()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn writes_under_memory_directory() {
		let dir = TempDir::new().unwrap();
		let args = serde_json::json!({"file_path": "notes/debug.md", "content": "remember"}).to_string();

		let out = MemoryWriteTool::new()
			.invoke(&args, &ToolContext::new(dir.path()))
			.await
			.unwrap();

		assert!(out.starts_with("Memory written: "));
		assert_eq!(
			std::fs::read_to_string(dir.path().join(MEMORY_DIR).join("notes/debug.md")).unwrap(),
			"remember"
		);
	}

	#[tokio::test]
	async fn traversal_out_of_memory_directory_is_rejected() {
		let dir = TempDir::new().unwrap();
		let args = serde_json::json!({"file_path": "../../Cargo.toml", "content": "x"}).to_string();

		let err = MemoryWriteTool::new()
			.invoke(&args, &ToolContext::new(dir.path()))
			.await
			.unwrap_err();

		assert!(err.to_string().contains("must not escape"));
		assert!(!dir.path().join("Cargo.toml").exists());
	}

	#[test]
	fn preview_names_memory_path() {
		let preview = MemoryWriteTool::new()
			.preview(r#"{"file_path":"MEMORY.md","content":"abc"}"#)
			.unwrap();
		assert_eq!(preview, "Write 3 bytes to memory: .stormtrooper/memory/MEMORY.md");
	}
}
