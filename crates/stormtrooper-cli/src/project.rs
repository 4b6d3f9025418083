// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Project instructions, persistent memory and the root system prompt.

use std::io;
use std::path::{Path, PathBuf};

use stormtrooper_cli_tools::MEMORY_DIR;
use tracing::debug;

/// Instruction files, highest priority first.
const INSTRUCTION_FILES: &[&str] = &["STORMTROOPER.md", "CLAUDE.md"];

const MEMORY_FILE: &str = "MEMORY.md";

const BASE_PROMPT: &str = "You are Stormtrooper, an AI coding assistant. You help developers by reading, editing, and searching code, running commands, and managing project context. Use the available tools to interact with the codebase.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectContext {
	pub working_dir: PathBuf,
	pub instructions: Option<String>,
	pub memory: Option<String>,
	pub platform: String,
	pub date: String,
}

/// Reads `path`, treating a missing file as absent.
fn read_optional(path: &Path) -> io::Result<Option<String>> {
	match std::fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e),
	}
}

impl ProjectContext {
	pub fn load(dir: &Path) -> io::Result<Self> {
		let working_dir = std::path::absolute(dir)?;

		let mut instructions = None;
		for name in INSTRUCTION_FILES {
			if let Some(content) = read_optional(&working_dir.join(name))? {
				debug!(file = name, "loaded project instructions");
				instructions = Some(content);
				break;
			}
		}

		let memory = read_optional(&working_dir.join(MEMORY_DIR).join(MEMORY_FILE))?;

		Ok(Self {
			working_dir,
			instructions,
			memory,
			platform: std::env::consts::OS.to_string(),
			date: chrono::Local::now().format("%Y-%m-%d").to_string(),
		})
	}

	/// Fallback used when the project files cannot be read.
	pub fn bare(dir: &Path) -> Self {
		Self {
			working_dir: dir.to_path_buf(),
			platform: std::env::consts::OS.to_string(),
			date: chrono::Local::now().format("%Y-%m-%d").to_string(),
			..Default::default()
		}
	}

	pub fn system_prompt(&self) -> String {
		let mut prompt = String::from(BASE_PROMPT);

		if let Some(instructions) = self.instructions.as_deref().filter(|s| !s.is_empty()) {
			prompt.push_str("\n\n# Project Instructions\n\n");
			prompt.push_str(instructions);
		}

		if let Some(memory) = self.memory.as_deref().filter(|s| !s.is_empty()) {
			prompt.push_str("\n\n# Memory\n\n");
			prompt.push_str(memory);
		}

		prompt.push_str("\n\n# Environment\n");
		prompt.push_str(&format!("- Working directory: {}\n", self.working_dir.display()));
		prompt.push_str(&format!("- Platform: {}\n", self.platform));
		prompt.push_str(&format!("- Date: {}\n", self.date));
		prompt
	}
}
