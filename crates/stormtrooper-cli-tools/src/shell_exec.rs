// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use stormtrooper_common_core::{PermissionTier, ToolContext, ToolError};
use tokio::process::Command;
use tokio::time::timeout;

use crate::Tool;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;
const MAX_OUTPUT_BYTES: usize = 50 * 1024; // 50KB combined

#[derive(Debug, Deserialize)]
struct ShellExecArgs {
	command: String,
	timeout: Option<u64>,
}

pub struct ShellExecTool;

impl ShellExecTool {
	pub fn new() -> Self {
		Self
	}

	fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
		let mut combined = Vec::with_capacity(stdout.len() + stderr.len());
		combined.extend_from_slice(stdout);
		combined.extend_from_slice(stderr);

		if combined.len() <= MAX_OUTPUT_BYTES {
			return String::from_utf8_lossy(&combined).to_string();
		}
		let mut out = String::from_utf8_lossy(&combined[..MAX_OUTPUT_BYTES]).to_string();
		out.push_str("\n\n[truncated: output exceeds 50KB]");
		out
	}
}

impl Default for ShellExecTool {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Tool for ShellExecTool {
	fn name(&self) -> &str {
		"shell_exec"
	}

	fn description(&self) -> &str {
		"Execute a shell command in the workspace directory and return its output"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
			"type": "object",
			"properties": {
				"command": {
					"type": "string",
					"description": "The shell command to execute"
				},
				"timeout": {
					"type": "integer",
					"minimum": 1,
					"maximum": 300,
					"description": "Timeout in seconds (default: 30, max: 300)"
				}
			},
			"required": ["command"]
		})
	}

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::RequiresApproval
	}

	fn preview(&self, args: &str) -> Option<String> {
		Some(match serde_json::from_str::<ShellExecArgs>(args) {
			Ok(args) => format!("Run command: {}", args.command),
			Err(_) => "Run command (invalid params)".to_string(),
		})
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: ShellExecArgs = serde_json::from_str(args)?;
		if args.command.trim().is_empty() {
			return Err(ToolError::InvalidArguments("command is required".to_string()));
		}

		let timeout_secs = args
			.timeout
			.filter(|t| *t > 0)
			.unwrap_or(DEFAULT_TIMEOUT_SECS)
			.min(MAX_TIMEOUT_SECS);

		tracing::debug!(
			command = %args.command,
			cwd = %ctx.workspace_root.display(),
			timeout_secs = timeout_secs,
			"executing shell command"
		);

		let mut cmd = Command::new("sh");
		cmd.arg("-c")
			.arg(&args.command)
			.current_dir(&ctx.workspace_root)
			.kill_on_drop(true);

		let finished = tokio::select! {
			_ = ctx.cancel.cancelled() => {
				tracing::info!(command = %args.command, "shell command cancelled");
				return Ok("Command cancelled".to_string());
			}
			finished = timeout(Duration::from_secs(timeout_secs), cmd.output()) => finished,
		};

		match finished {
			Ok(Ok(output)) => {
				let combined = Self::combine_output(&output.stdout, &output.stderr);
				tracing::debug!(
					exit_code = ?output.status.code(),
					output_len = combined.len(),
					"shell command completed"
				);
				if output.status.success() {
					Ok(combined)
				} else {
					let code = output
						.status
						.code()
						.map_or_else(|| "signal".to_string(), |c| c.to_string());
					Ok(format!("Exit code: {code}\n{combined}"))
				}
			}
			Ok(Err(e)) => {
				tracing::warn!(error = %e, "shell command failed to execute");
				Err(ToolError::Io(e.to_string()))
			}
			Err(_) => {
				tracing::warn!(
					command = %args.command,
					timeout_secs = timeout_secs,
					"shell command timed out"
				);
				Ok(format!("Command timed out after {timeout_secs}s"))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	async fn run(dir: &TempDir, args: serde_json::Value) -> String {
		ShellExecTool::new()
			.invoke(&args.to_string(), &ToolContext::new(dir.path()))
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn runs_in_workspace_directory() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("marker.txt"), "").unwrap();

		let out = run(&dir, serde_json::json!({"command": "ls"})).await;
		assert!(out.contains("marker.txt"));
	}

	#[tokio::test]
	async fn non_zero_exit_is_reported_in_text() {
		let dir = TempDir::new().unwrap();
		let out = run(&dir, serde_json::json!({"command": "echo oops >&2; exit 3"})).await;
		assert_eq!(out, "Exit code: 3\noops\n");
	}

	#[tokio::test]
	async fn slow_commands_time_out() {
		let dir = TempDir::new().unwrap();
		let out = run(&dir, serde_json::json!({"command": "sleep 5", "timeout": 1})).await;
		assert_eq!(out, "Command timed out after 1s");
	}

	#[tokio::test]
	async fn cancellation_stops_the_command() {
		let dir = TempDir::new().unwrap();
		let ctx = ToolContext::new(dir.path());
		let cancel = ctx.cancel.clone();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			cancel.cancel();
		});

		let out = ShellExecTool::new()
			.invoke(r#"{"command":"sleep 10"}"#, &ctx)
			.await
			.unwrap();
		assert_eq!(out, "Command cancelled");
	}

	#[test]
	fn large_output_is_truncated() {
		let out = ShellExecTool::combine_output(&vec![b'x'; MAX_OUTPUT_BYTES + 10], b"");
		assert!(out.ends_with("[truncated: output exceeds 50KB]"));
		assert!(out.len() < MAX_OUTPUT_BYTES + 100);
	}

	#[test]
	fn preview_names_the_command() {
		let preview = ShellExecTool::new().preview(r#"{"command":"cargo test"}"#);
		assert_eq!(preview.as_deref(), Some("Run command: cargo test"));
	}
}
