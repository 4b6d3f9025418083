// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use stormtrooper_common_core::{ToolContext, ToolError};

use crate::paths::resolve_existing;
use crate::Tool;

const MAX_MATCHES: usize = 500;
const SKIP_DIRS: &[&str] = &["node_modules", "vendor", "__pycache__", "target"];

#[derive(Debug, Deserialize)]
struct GrepArgs {
	pattern: String,
	path: Option<PathBuf>,
	include: Option<String>,
}

pub struct GrepTool;

impl GrepTool {
	pub fn new() -> Self {
		Self
	}

	fn is_binary(path: &Path) -> bool {
		let mut buf = [0u8; 512];
		match std::fs::File::open(path).and_then(|mut f| f.read(&mut buf)) {
			Ok(n) => buf[..n].contains(&0),
			Err(_) => false,
		}
	}

	fn grep_file(path: &Path, display_root: &Path, re: &Regex, out: &mut Vec<String>) {
		let Ok(contents) = std::fs::read_to_string(path) else {
			return;
		};
		let shown = path.strip_prefix(display_root).unwrap_or(path).display().to_string();
		for (idx, line) in contents.lines().enumerate() {
			if out.len() > MAX_MATCHES {
				return;
			}
			if re.is_match(line) {
				out.push(format!("{shown}:{}:{line}", idx + 1));
			}
		}
	}

	fn search(
		base: &Path,
		display_root: &Path,
		re: &Regex,
		include: Option<&glob::Pattern>,
	) -> Vec<String> {
		let mut matches = Vec::new();

		if base.is_file() {
			Self::grep_file(base, display_root, re, &mut matches);
			return matches;
		}

		let walker = ignore::WalkBuilder::new(base)
			.hidden(true)
			.git_ignore(true)
			.filter_entry(|entry| {
				let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
				!(is_dir && SKIP_DIRS.contains(&entry.file_name().to_string_lossy().as_ref()))
			})
			.sort_by_file_path(|a, b| a.cmp(b))
			.build();

		for entry in walker.flatten() {
			if matches.len() > MAX_MATCHES {
				break;
			}
			if !entry.file_type().is_some_and(|ft| ft.is_file()) {
				continue;
			}
			let path = entry.path();
			if let Some(include) = include {
				let name = entry.file_name().to_string_lossy();
				if !include.matches(&name) {
					continue;
				}
			}
			if Self::is_binary(path) {
				continue;
			}
			Self::grep_file(path, display_root, re, &mut matches);
		}

		matches
	}
}

impl Default for GrepTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for GrepTool {
	fn name(&self) -> &str {
		"grep"
	}

	fn description(&self) -> &str {
		"Search file contents using a regex pattern. Respects .gitignore and skips binary and hidden files."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"pattern": {
								"type": "string",
								"description": "Regex pattern to search for"
						},
						"path": {
								"type": "string",
								"description": "File or directory to search in (default: workspace root)"
						},
						"include": {
								"type": "string",
								"description": "Glob pattern to filter file names (e.g., '*.rs')"
						}
				},
				"required": ["pattern"]
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: GrepArgs = serde_json::from_str(args)?;
		if args.pattern.is_empty() {
			return Err(ToolError::InvalidArguments("pattern is required".to_string()));
		}

		let re = Regex::new(&args.pattern)
			.map_err(|e| ToolError::InvalidArguments(format!("invalid regex: {e}")))?;
		let include = args
			.include
			.as_deref()
			.map(glob::Pattern::new)
			.transpose()
			.map_err(|e| ToolError::InvalidArguments(format!("invalid include pattern: {e}")))?;

		let root = resolve_existing(Path::new("."), &ctx.workspace_root)?;
		let base = match &args.path {
			Some(path) => resolve_existing(path, &ctx.workspace_root)?,
			None => root.clone(),
		};

		let mut matches =
			tokio::task::spawn_blocking(move || Self::search(&base, &root, &re, include.as_ref()))
				.await
				.map_err(|e| ToolError::Internal(e.to_string()))?;

		tracing::debug!(pattern = %args.pattern, matches = matches.len(), "grep complete");

		if matches.is_empty() {
			return Ok(format!("No matches found for pattern: {}", args.pattern));
		}

		let truncated = matches.len() > MAX_MATCHES;
		matches.truncate(MAX_MATCHES);
		let mut out = matches.join("\n");
		if truncated {
			out.push_str(&format!(
				"\n\n[truncated: showing first {MAX_MATCHES} matches]"
			));
		}
		Ok(out)
	}
}
