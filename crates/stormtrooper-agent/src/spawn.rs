// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Delegating a task to a nested orchestrator.
//!
//! The `spawn_agent` tool runs a fresh [`Agent`] with its own history but the
//! same protocol client, tool registry, permission handler and cancellation
//! token as its parent. The child's visible text is captured and becomes the
//! tool result; it is never streamed to the parent's token sink.

use std::any::Any;
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use serde::Deserialize;
use stormtrooper_cli_tools::{Tool, ToolRegistry};
use stormtrooper_common_core::{
	truncate_chars, ActivityEvent, AgentConfig, AgentError, LlmClient, PermissionHandler,
	PermissionTier, TokenSink, ToolContext, ToolError,
};
use tracing::{info, warn};

use crate::Agent;

/// Characters of the task shown in previews and activity markers.
pub const SUB_AGENT_TASK_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Deserialize)]
struct SpawnAgentArgs {
	task: String,
	#[serde(default)]
	model: Option<String>,
}

fn sub_agent_prompt(task: &str) -> String {
	format!(
		"You are a sub-agent. Complete the following task:\n\n{task}\n\nWhen done, provide a concise summary of what you did and the results."
	)
}

/// Token sink that buffers everything it receives.
#[derive(Debug, Default)]
pub struct CapturedTokens {
	text: Mutex<String>,
}

impl CapturedTokens {
	pub fn take(&self) -> String {
		match self.text.lock() {
			Ok(mut text) => std::mem::take(&mut *text),
			Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
		}
	}
}

#[async_trait]
impl TokenSink for CapturedTokens {
	async fn token(&self, text: &str) {
		match self.text.lock() {
			Ok(mut buffer) => buffer.push_str(text),
			Err(poisoned) => poisoned.into_inner().push_str(text),
		}
	}
}

pub struct SpawnAgentTool {
	llm: Arc<dyn LlmClient>,
	tools: Weak<ToolRegistry>,
	permission: Arc<dyn PermissionHandler>,
	config: AgentConfig,
}

impl SpawnAgentTool {
	/// The registry is held weakly because this tool lives inside it.
	pub fn new(
		llm: Arc<dyn LlmClient>,
		tools: Weak<ToolRegistry>,
		permission: Arc<dyn PermissionHandler>,
		config: AgentConfig,
	) -> Self {
		Self {
			llm,
			tools,
			permission,
			config,
		}
	}
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_string()
	}
}

#[async_trait]
impl Tool for SpawnAgentTool {
	fn name(&self) -> &str {
		"spawn_agent"
	}

	fn description(&self) -> &str {
		"Delegate a self-contained task to a sub-agent with its own conversation. \
		 The sub-agent can use the same tools and returns a summary of its work."
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({
				"type": "object",
				"properties": {
						"task": {
								"type": "string",
								"description": "Complete description of the task for the sub-agent"
						},
						"model": {
								"type": "string",
								"description": "Optional model override for the sub-agent"
						}
				},
				"required": ["task"]
		})
	}

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::RequiresApproval
	}

	fn preview(&self, args: &str) -> Option<String> {
		let Ok(args) = serde_json::from_str::<SpawnAgentArgs>(args) else {
			return Some("Spawn sub-agent (invalid params)".to_string());
		};
		Some(format!(
			"Spawn sub-agent: {}",
			truncate_chars(&args.task, SUB_AGENT_TASK_PREVIEW_CHARS)
		))
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		let args: SpawnAgentArgs = serde_json::from_str(args)?;
		if args.task.trim().is_empty() {
			return Err(ToolError::InvalidArguments("task must not be empty".to_string()));
		}
		let tools = self
			.tools
			.upgrade()
			.ok_or_else(|| ToolError::Internal("tool registry no longer available".to_string()))?;

		let mut config = self.config.clone();
		config.workspace_root = ctx.workspace_root.clone();
		if let Some(model) = args.model.filter(|m| !m.trim().is_empty()) {
			config.model_name = model;
		}

		info!(model = %config.model_name, "spawning sub-agent");
		ctx.activity
			.record(ActivityEvent::SubAgentSpawned {
				task: truncate_chars(&args.task, SUB_AGENT_TASK_PREVIEW_CHARS),
			})
			.await;

		let output = Arc::new(CapturedTokens::default());
		let mut child = Agent::new(config, self.llm.clone(), tools, self.permission.clone())
			.with_system_prompt(sub_agent_prompt(&args.task))
			.with_sinks(output.clone(), ctx.activity.clone());

		let cancel = ctx.cancel.clone();
		let task = args.task;
		let mut handle = tokio::spawn(async move { child.send(&cancel, &task).await });

		let joined = tokio::select! {
			biased;
			_ = ctx.cancel.cancelled() => {
				handle.abort();
				info!("sub-agent abandoned after cancellation");
				ctx.activity.record(ActivityEvent::SubAgentFinished).await;
				return Ok(format!("Sub-agent cancelled: {}", AgentError::Cancelled));
			}
			joined = &mut handle => joined,
		};

		ctx.activity.record(ActivityEvent::SubAgentFinished).await;

		let result = match joined {
			Err(e) if e.is_panic() => {
				let message = panic_message(e.into_panic());
				warn!(panic = %message, "sub-agent panicked");
				format!("Sub-agent error: sub-agent panic: {message}")
			}
			Err(e) => format!("Sub-agent error: {e}"),
			Ok(Err(e)) if e.is_cancelled() => format!("Sub-agent cancelled: {e}"),
			Ok(Err(e)) => {
				warn!(error = %e, "sub-agent failed");
				format!("Sub-agent error: {e}")
			}
			Ok(Ok(())) => {
				let text = output.take();
				if text.trim().is_empty() {
					"Sub-agent completed with no output".to_string()
				} else {
					text
				}
			}
		};
		Ok(result)
	}
}

/// Builds a shared registry holding `tools` plus a `spawn_agent` tool whose
/// children see the same registry.
pub fn registry_with_spawn(
	tools: Vec<Arc<dyn Tool>>,
	llm: Arc<dyn LlmClient>,
	permission: Arc<dyn PermissionHandler>,
	config: AgentConfig,
) -> Result<Arc<ToolRegistry>, ToolError> {
	let mut failure = None;
	let registry = Arc::new_cyclic(|weak| {
		let mut registry = ToolRegistry::new();
		let spawn: Arc<dyn Tool> =
			Arc::new(SpawnAgentTool::new(llm, weak.clone(), permission, config));
		for tool in tools.into_iter().chain(std::iter::once(spawn)) {
			if let Err(e) = registry.register(tool) {
				failure.get_or_insert(e);
			}
		}
		registry
	});

	match failure {
		Some(e) => Err(e),
		None => Ok(registry),
	}
}
