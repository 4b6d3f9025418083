// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use glob::MatchOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stormtrooper_common_core::{ToolContext, ToolError};

use crate::paths::resolve_existing;
use crate::Tool;

const MAX_RESULTS: usize = 1000;

#[derive(Debug, Deserialize)]
struct GlobArgs {
	pattern: String,
	path: Option<PathBuf>,
}

pub struct GlobTool;

impl GlobTool {
	pub fn new() -> Self {
		Self
	}

	fn find(base: &Path, display_root: &Path, pattern: &str) -> Result<Vec<String>, ToolError> {
		let full_pattern = base.join(pattern);
		let options = MatchOptions {
			require_literal_leading_dot: true,
			..MatchOptions::new()
		};

		let paths = glob::glob_with(&full_pattern.to_string_lossy(), options)
			.map_err(|e| ToolError::InvalidArguments(format!("invalid pattern: {e}")))?;

		let mut matches: Vec<String> = paths
			.filter_map(Result::ok)
			.filter(|p| p.is_file())
			.map(|p| {
				p.strip_prefix(display_root)
					.unwrap_or(&p)
					.display()
					.to_string()
			})
			.collect();
		matches.sort();
		Ok(matches)
	}
}

impl Default for GlobTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for GlobTool {
	fn name(&self) -> &str {
		"glob"
	}

	fn description(&self) -> &str {
		"Find files matching a glob pattern"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"pattern": {
								"type": "string",
								"description": "Glob pattern to match files (e.g., '**/*.rs', 'src/*.ts')"
						},
						"path": {
								"type": "string",
								"description": "Directory to search in (default: workspace root)"
						}
				},
				"required": ["pattern"]
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: GlobArgs = serde_json::from_str(args)?;
		if args.pattern.is_empty() {
			return Err(ToolError::InvalidArguments("pattern is required".to_string()));
		}

		let root = resolve_existing(Path::new("."), &ctx.workspace_root)?;
		let base = match &args.path {
			Some(path) => resolve_existing(path, &ctx.workspace_root)?,
			None => root.clone(),
		};

		let pattern = args.pattern.clone();
		let mut matches = tokio::task::spawn_blocking(move || Self::find(&base, &root, &pattern))
			.await
			.map_err(|e| ToolError::Internal(e.to_string()))??;

		tracing::debug!(pattern = %args.pattern, matches = matches.len(), "glob complete");

		if matches.is_empty() {
			return Ok(format!("No files matched the pattern: {}", args.pattern));
		}

		let truncated = matches.len() > MAX_RESULTS;
		matches.truncate(MAX_RESULTS);
		let mut out = matches.join("\n");
		if truncated {
			out.push_str(&format!(
				"\n\n[truncated: showing first {MAX_RESULTS} results]"
			));
		}
		Ok(out)
	}
}
