// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fakes shared by the orchestrator tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use stormtrooper_cli_tools::{Tool, ToolRegistry};
use stormtrooper_common_core::{
	ActivityEvent, ActivitySink, DeltaHandler, LlmClient, LlmError, LlmRequest, LlmResponse, Message,
	PermissionHandler, PermissionTier, StreamDelta, TokenSink, ToolCallFragment, ToolContext,
	ToolError,
};
use stormtrooper_llm_openai::DeltaAccumulator;
use tokio::sync::Notify;

/// Replays one delta script per request, in order.
pub struct ScriptedLlm {
	scripts: Mutex<VecDeque<Vec<StreamDelta>>>,
	failure: Option<LlmError>,
	requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
	pub fn new(scripts: Vec<Vec<StreamDelta>>) -> Self {
		Self {
			scripts: Mutex::new(scripts.into()),
			failure: None,
			requests: Mutex::new(Vec::new()),
		}
	}

	pub fn failing(error: LlmError) -> Self {
		Self {
			failure: Some(error),
			..Self::new(vec![])
		}
	}

	pub fn call_count(&self) -> usize {
		self.requests.lock().unwrap().len()
	}

	pub fn requests(&self) -> Vec<LlmRequest> {
		self.requests.lock().unwrap().clone()
	}
}

#[async_trait]
impl LlmClient for ScriptedLlm {
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
		let message = self
			.complete_streaming(request, &mut IgnoreDeltas)
			.await?;
		Ok(LlmResponse {
			message,
			finish_reason: Some("stop".to_string()),
		})
	}

	async fn complete_streaming(
		&self,
		request: LlmRequest,
		on_delta: &mut dyn DeltaHandler,
	) -> Result<Message, LlmError> {
		self.requests.lock().unwrap().push(request);
		if let Some(error) = &self.failure {
			return Err(error.clone());
		}
		let script = self
			.scripts
			.lock()
			.unwrap()
			.pop_front()
			.ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))?;

		let mut accumulator = DeltaAccumulator::new();
		for delta in &script {
			on_delta.on_delta(delta).await;
			accumulator.push(delta);
		}
		Ok(accumulator.finish())
	}
}

struct IgnoreDeltas;

#[async_trait]
impl DeltaHandler for IgnoreDeltas {
	async fn on_delta(&mut self, _delta: &StreamDelta) {}
}

/// Never answers; signals `started` once a request arrives.
#[derive(Default)]
pub struct PendingLlm {
	pub started: Arc<Notify>,
}

#[async_trait]
impl LlmClient for PendingLlm {
	async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse, LlmError> {
		self.started.notify_one();
		std::future::pending().await
	}

	async fn complete_streaming(
		&self,
		_request: LlmRequest,
		_on_delta: &mut dyn DeltaHandler,
	) -> Result<Message, LlmError> {
		self.started.notify_one();
		std::future::pending().await
	}
}

/// Builds the deltas of one assistant message calling each `(id, name, args)`.
pub fn tool_call_script(calls: &[(&str, &str, &str)]) -> Vec<StreamDelta> {
	calls
		.iter()
		.enumerate()
		.map(|(index, (id, name, args))| StreamDelta {
			tool_calls: vec![ToolCallFragment {
				index,
				id: Some(id.to_string()),
				call_type: Some("function".to_string()),
				name: Some(name.to_string()),
				arguments: Some(args.to_string()),
			}],
			..Default::default()
		})
		.collect()
}

#[derive(Default)]
pub struct RecordingTokens {
	pieces: Mutex<Vec<String>>,
}

impl RecordingTokens {
	pub fn pieces(&self) -> Vec<String> {
		self.pieces.lock().unwrap().clone()
	}

	pub fn text(&self) -> String {
		self.pieces().concat()
	}
}

#[async_trait]
impl TokenSink for RecordingTokens {
	async fn token(&self, text: &str) {
		self.pieces.lock().unwrap().push(text.to_string());
	}
}

#[derive(Default)]
pub struct RecordingActivity {
	events: Mutex<Vec<ActivityEvent>>,
}

impl RecordingActivity {
	pub fn events(&self) -> Vec<ActivityEvent> {
		self.events.lock().unwrap().clone()
	}
}

#[async_trait]
impl ActivitySink for RecordingActivity {
	async fn record(&self, event: ActivityEvent) {
		self.events.lock().unwrap().push(event);
	}
}

pub struct AllowAll;

#[async_trait]
impl PermissionHandler for AllowAll {
	async fn check(&self, _tool_name: &str, _preview: &str) -> bool {
		true
	}
}

pub struct DenyAll;

#[async_trait]
impl PermissionHandler for DenyAll {
	async fn check(&self, _tool_name: &str, _preview: &str) -> bool {
		false
	}
}

/// Test tool with a fixed behavior per name.
struct FakeTool {
	name: &'static str,
	tier: PermissionTier,
}

#[derive(Deserialize)]
struct EchoArgs {
	text: String,
}

#[async_trait]
impl Tool for FakeTool {
	fn name(&self) -> &str {
		self.name
	}

	fn description(&self) -> &str {
		"test tool"
	}

	fn input_schema(&self) -> serde_json::Value {
		serde_json::json!({ "type": "object", "properties": {} })
	}

	fn permission_tier(&self) -> PermissionTier {
		self.tier
	}

	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError> {
		match self.name {
			"echo" => {
				let args: EchoArgs = serde_json::from_str(args)?;
				Ok(args.text)
			}
			"cancel_turn" => {
				ctx.cancel.cancel();
				Ok("cancelled".to_string())
			}
			"explode" => panic!("tool exploded"),
			"stuck" => std::future::pending().await,
			_ => Ok("guarded ran".to_string()),
		}
	}
}

/// `echo` (auto), `guarded` (approval), `cancel_turn` and `explode`.
pub fn echo_tools() -> Vec<Arc<dyn Tool>> {
	vec![
		Arc::new(FakeTool {
			name: "echo",
			tier: PermissionTier::Auto,
		}),
		Arc::new(FakeTool {
			name: "guarded",
			tier: PermissionTier::RequiresApproval,
		}),
		Arc::new(FakeTool {
			name: "cancel_turn",
			tier: PermissionTier::Auto,
		}),
		Arc::new(FakeTool {
			name: "explode",
			tier: PermissionTier::Auto,
		}),
	]
}

/// Auto-tier tool that never returns and never looks at the token.
pub fn stuck_tool() -> Arc<dyn Tool> {
	Arc::new(FakeTool {
		name: "stuck",
		tier: PermissionTier::Auto,
	})
}

pub fn echo_registry() -> Arc<ToolRegistry> {
	let mut registry = ToolRegistry::new();
	for tool in echo_tools() {
		registry.register(tool).unwrap();
	}
	Arc::new(registry)
}
