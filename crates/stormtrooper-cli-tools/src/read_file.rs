// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use stormtrooper_common_core::{ToolContext, ToolError};

use crate::paths::resolve_existing;
use crate::Tool;

const MAX_BYTES: u64 = 1024 * 1024; // 1MB

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
	file_path: PathBuf,
	/// 1-based first line to return.
	offset: Option<usize>,
	limit: Option<usize>,
}

pub struct ReadFileTool;

impl ReadFileTool {
	pub fn new() -> Self {
		Self
	}
}

impl Default for ReadFileTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for ReadFileTool {
	fn name(&self) -> &str {
		"read_file"
	}

	fn description(&self) -> &str {
		"Read the contents of a file. Lines are returned numbered."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"file_path": {
								"type": "string",
								"description": "Path to the file to read (absolute or relative to workspace)"
						},
						"offset": {
								"type": "integer",
								"description": "Line number to start reading from (1-based)"
						},
						"limit": {
								"type": "integer",
								"description": "Maximum number of lines to return"
						}
				},
				"required": ["file_path"]
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: ReadFileArgs = serde_json::from_str(args)?;
		let path = resolve_existing(&args.file_path, &ctx.workspace_root)?;

		let metadata = tokio::fs::metadata(&path).await?;
		if metadata.is_dir() {
			return Err(ToolError::InvalidArguments(format!(
				"{} is a directory, not a file",
				path.display()
			)));
		}

		let truncated = metadata.len() > MAX_BYTES;
		let bytes = tokio::fs::read(&path).await?;
		let bytes = if truncated {
			tracing::info!(
					path = %path.display(),
					file_size = metadata.len(),
					"file truncated due to size limit"
			);
			&bytes[..MAX_BYTES as usize]
		} else {
			&bytes[..]
		};
		let contents = String::from_utf8_lossy(bytes);

		let start = args.offset.unwrap_or(1).max(1);
		let limit = args.limit.unwrap_or(usize::MAX);

		let mut out = String::new();
		for (idx, line) in contents.lines().enumerate().skip(start - 1).take(limit) {
			out.push_str(&format!("{:>6}\t{}\n", idx + 1, line));
		}
		if truncated {
			out.push_str("\n[truncated: file exceeds 1MB]");
		}

		tracing::debug!(
				path = %path.display(),
				bytes_read = bytes.len(),
				truncated = truncated,
				"file read complete"
		);

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	async fn read(dir: &TempDir, args: serde_json::Value) -> Result<String, ToolError> {
		ReadFileTool::new()
			.invoke(&args.to_string(), &ToolContext::new(dir.path()))
			.await
	}

	#[tokio::test]
	async fn returns_numbered_lines() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("main.rs"), "fn main() {\n}\n").unwrap();

		let out = read(&dir, serde_json::json!({"file_path": "main.rs"})).await.unwrap();
		assert_eq!(out, "     1\tfn main() {\n     2\t}\n");
	}

	#[tokio::test]
	async fn honours_offset_and_limit() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("f.txt"), "a\nb\nc\nd\n").unwrap();

		let out = read(&dir, serde_json::json!({"file_path": "f.txt", "offset": 2, "limit": 2}))
			.await
			.unwrap();
		assert_eq!(out, "     2\tb\n     3\tc\n");
	}

	#[tokio::test]
	async fn missing_file_is_an_error() {
		let dir = TempDir::new().unwrap();
		let err = read(&dir, serde_json::json!({"file_path": "nope.txt"})).await.unwrap_err();
		assert!(matches!(err, ToolError::FileNotFound(_)));
	}

	#[tokio::test]
	async fn directories_are_rejected() {
		let dir = TempDir::new().unwrap();
		std::fs::create_dir(dir.path().join("src")).unwrap();
		let err = read(&dir, serde_json::json!({"file_path": "src"})).await.unwrap_err();
		assert!(matches!(err, ToolError::InvalidArguments(_)));
	}

	#[tokio::test]
	async fn malformed_arguments_are_rejected() {
		let dir = TempDir::new().unwrap();
		let err = ReadFileTool::new()
			.invoke("{\"file_path\":", &ToolContext::new(dir.path()))
			.await
			.unwrap_err();
		assert!(matches!(err, ToolError::InvalidArguments(_)));
	}
}
