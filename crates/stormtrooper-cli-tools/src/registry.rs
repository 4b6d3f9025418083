// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use stormtrooper_common_core::{
	truncate_chars, ActivityEvent, PermissionHandler, PermissionTier, ToolCall, ToolContext,
	ToolDefinition, ToolError,
};
use tracing::{debug, info, instrument, warn};

/// Result text returned to the model when the user refuses a tool call.
pub const DENIED_RESULT: &str = "Permission denied by user";

/// Length of the argument excerpt in the generic permission preview.
pub const PREVIEW_MAX_CHARS: usize = 200;

#[async_trait]
pub trait Tool: Send + Sync {
	fn name(&self) -> &str;

	fn description(&self) -> &str;

	fn input_schema(&self) -> serde_json::Value;

	fn permission_tier(&self) -> PermissionTier {
		PermissionTier::Auto
	}

	/// Human-readable summary shown when asking for approval. `None` falls
	/// back to `name(args)`.
	fn preview(&self, _args: &str) -> Option<String> {
		None
	}

	fn to_definition(&self) -> ToolDefinition {
		ToolDefinition {
			name: self.name().to_string(),
			description: self.description().to_string(),
			input_schema: self.input_schema(),
		}
	}

	/// Runs the tool with the raw argument payload the model produced.
	async fn invoke(&self, args: &str, ctx: &ToolContext) -> Result<String, ToolError>;
}

/// Catalog of tools, kept in registration order.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
	tools: Vec<Arc<dyn Tool>>,
	by_name: HashMap<String, usize>,
}

impl ToolRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a tool. Names are unique; a second registration under the same
	/// name is rejected.
	pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
		let name = tool.name().to_string();
		if self.by_name.contains_key(&name) {
			return Err(ToolError::DuplicateRegistration(name));
		}
		debug!(tool_name = %name, "registering tool");
		self.by_name.insert(name, self.tools.len());
		self.tools.push(tool);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&dyn Tool> {
		self.by_name.get(name).map(|&idx| self.tools[idx].as_ref())
	}

	/// Tool catalog for the next completion request, in registration order.
	pub fn definitions(&self) -> Vec<ToolDefinition> {
		self.tools.iter().map(|t| t.to_definition()).collect()
	}

	pub fn len(&self) -> usize {
		self.tools.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tools.is_empty()
	}

	/// Runs one model-requested call through the permission gate.
	///
	/// Always yields result text for the conversation. Unknown tools,
	/// refusals and tool failures are reported in that text rather than as
	/// errors, and each outcome is also recorded on `ctx.activity`.
	#[instrument(skip_all, fields(tool_name = %call.name, call_id = %call.id))]
	pub async fn dispatch(
		&self,
		call: &ToolCall,
		permission: &dyn PermissionHandler,
		ctx: &ToolContext,
	) -> String {
		let Some(tool) = self.get(&call.name) else {
			warn!("model requested unknown tool");
			ctx.activity
				.record(ActivityEvent::UnknownTool {
					id: call.id.clone(),
					name: call.name.clone(),
				})
				.await;
			return format!("Unknown tool: {}", call.name);
		};

		if tool.permission_tier() == PermissionTier::RequiresApproval {
			let preview = tool.preview(&call.arguments).unwrap_or_else(|| {
				format!(
					"{}({})",
					call.name,
					truncate_chars(&call.arguments, PREVIEW_MAX_CHARS)
				)
			});

			if !permission.check(&call.name, &preview).await {
				info!("tool call denied");
				ctx.activity
					.record(ActivityEvent::ToolDenied {
						id: call.id.clone(),
						name: call.name.clone(),
					})
					.await;
				return DENIED_RESULT.to_string();
			}
			debug!("tool call approved");
		}

		ctx.activity
			.record(ActivityEvent::ToolStarted {
				id: call.id.clone(),
				name: call.name.clone(),
				args: call.arguments.clone(),
			})
			.await;

		match tool.invoke(&call.arguments, ctx).await {
			Ok(result) => {
				debug!(result_len = result.len(), "tool call completed");
				ctx.activity
					.record(ActivityEvent::ToolCompleted {
						id: call.id.clone(),
						name: call.name.clone(),
						result: result.clone(),
					})
					.await;
				result
			}
			Err(e) => {
				warn!(error = %e, "tool call failed");
				ctx.activity
					.record(ActivityEvent::ToolFailed {
						id: call.id.clone(),
						name: call.name.clone(),
						error: e.to_string(),
					})
					.await;
				format!("Tool error: {e}")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Mutex;
	use stormtrooper_common_core::ActivitySink;

	struct MockTool {
		name: String,
	}

	#[async_trait]
	impl Tool for MockTool {
		fn name(&self) -> &str {
			&self.name
		}

		fn description(&self) -> &str {
			"A mock tool for testing"
		}

		fn input_schema(&self) -> serde_json::Value {
			serde_json::json!({
					"type": "object",
					"properties": {}
			})
		}

		async fn invoke(&self, _args: &str, _ctx: &ToolContext) -> Result<String, ToolError> {
			Ok("ok".to_string())
		}
	}

	/// Approval-tier tool that counts how often it actually runs.
	struct SpyTool {
		invocations: AtomicUsize,
		preview: Option<String>,
		fail: bool,
	}

	impl SpyTool {
		fn new() -> Self {
			Self {
				invocations: AtomicUsize::new(0),
				preview: None,
				fail: false,
			}
		}
	}

	#[async_trait]
	impl Tool for SpyTool {
		fn name(&self) -> &str {
			"spy"
		}

		fn description(&self) -> &str {
			"Counts invocations"
		}

		fn input_schema(&self) -> serde_json::Value {
			serde_json::json!({"type": "object"})
		}

		fn permission_tier(&self) -> PermissionTier {
			PermissionTier::RequiresApproval
		}

		fn preview(&self, _args: &str) -> Option<String> {
			self.preview.clone()
		}

		async fn invoke(&self, args: &str, _ctx: &ToolContext) -> Result<String, ToolError> {
			self.invocations.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				return Err(ToolError::InvalidArguments("bad input".to_string()));
			}
			Ok(format!("ran with {args}"))
		}
	}

	/// Permission handler with a fixed answer that records what it was asked.
	struct FixedPermission {
		allow: bool,
		asked: Mutex<Vec<(String, String)>>,
	}

	impl FixedPermission {
		fn new(allow: bool) -> Self {
			Self {
				allow,
				asked: Mutex::new(Vec::new()),
			}
		}
	}

	#[async_trait]
	impl PermissionHandler for FixedPermission {
		async fn check(&self, tool_name: &str, preview: &str) -> bool {
			self.asked
				.lock()
				.unwrap()
				.push((tool_name.to_string(), preview.to_string()));
			self.allow
		}
	}

	#[derive(Default)]
	struct RecordingActivity {
		events: Mutex<Vec<ActivityEvent>>,
	}

	#[async_trait]
	impl ActivitySink for RecordingActivity {
		async fn record(&self, event: ActivityEvent) {
			self.events.lock().unwrap().push(event);
		}
	}

	fn context(activity: Arc<RecordingActivity>) -> ToolContext {
		ToolContext::new(std::env::temp_dir()).with_activity(activity)
	}

	fn registry_with(tool: Arc<dyn Tool>) -> ToolRegistry {
		let mut registry = ToolRegistry::new();
		registry.register(tool).unwrap();
		registry
	}

	proptest! {
			/// Verifies that any tool registered with a valid name can be retrieved by that exact name.
			/// This property ensures the registry maintains consistent key-value semantics.
			#[test]
			fn registry_stores_and_retrieves_tools_by_name(name in "[a-zA-Z][a-zA-Z0-9_]{0,30}") {
					let mut registry = ToolRegistry::new();
					registry.register(Arc::new(MockTool { name: name.clone() })).unwrap();

					prop_assert!(registry.get(&name).is_some());
					prop_assert_eq!(registry.get(&name).unwrap().name(), name);
			}

			/// Verifies that definitions() lists tools exactly in registration order.
			/// This property keeps the catalog the model sees stable between requests.
			#[test]
			fn definitions_preserve_registration_order(
					names in prop::collection::hash_set("[a-zA-Z][a-zA-Z0-9_]{0,20}", 0..10)
			) {
					let names: Vec<String> = names.into_iter().collect();
					let mut registry = ToolRegistry::new();
					for name in &names {
							registry.register(Arc::new(MockTool { name: name.clone() })).unwrap();
					}

					let listed: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
					prop_assert_eq!(listed, names);
			}
	}

	#[test]
	fn get_returns_none_for_unregistered_tool() {
		let registry = ToolRegistry::new();
		assert!(registry.get("nonexistent").is_none());
		assert!(registry.is_empty());
	}

	#[test]
	fn duplicate_registration_is_rejected() {
		let mut registry = ToolRegistry::new();
		registry
			.register(Arc::new(MockTool { name: "dup".into() }))
			.unwrap();
		let err = registry
			.register(Arc::new(MockTool { name: "dup".into() }))
			.unwrap_err();

		assert!(matches!(err, ToolError::DuplicateRegistration(name) if name == "dup"));
		assert_eq!(registry.len(), 1);
	}

	#[tokio::test]
	async fn unknown_tool_yields_result_text_naming_it() {
		let activity = Arc::new(RecordingActivity::default());
		let registry = ToolRegistry::new();
		let call = ToolCall::new("call_1", "teleport", "{}");

		let result = registry
			.dispatch(&call, &FixedPermission::new(true), &context(activity.clone()))
			.await;

		assert_eq!(result, "Unknown tool: teleport");
		assert_eq!(
			activity.events.lock().unwrap().as_slice(),
			&[ActivityEvent::UnknownTool {
				id: "call_1".into(),
				name: "teleport".into()
			}]
		);
	}

	#[tokio::test]
	async fn denied_tool_is_never_invoked() {
		let spy = Arc::new(SpyTool::new());
		let activity = Arc::new(RecordingActivity::default());
		let registry = registry_with(spy.clone());
		let permission = FixedPermission::new(false);

		let result = registry
			.dispatch(
				&ToolCall::new("call_1", "spy", "{\"x\":1}"),
				&permission,
				&context(activity.clone()),
			)
			.await;

		assert_eq!(result, DENIED_RESULT);
		assert_eq!(spy.invocations.load(Ordering::SeqCst), 0);
		assert_eq!(permission.asked.lock().unwrap().len(), 1);
		assert!(matches!(
			activity.events.lock().unwrap().as_slice(),
			[ActivityEvent::ToolDenied { .. }]
		));
	}

	#[tokio::test]
	async fn approved_tool_runs_and_reports_markers() {
		let spy = Arc::new(SpyTool::new());
		let activity = Arc::new(RecordingActivity::default());
		let registry = registry_with(spy.clone());

		let result = registry
			.dispatch(
				&ToolCall::new("call_1", "spy", "{}"),
				&FixedPermission::new(true),
				&context(activity.clone()),
			)
			.await;

		assert_eq!(result, "ran with {}");
		assert_eq!(spy.invocations.load(Ordering::SeqCst), 1);
		let events = activity.events.lock().unwrap();
		assert!(matches!(
			events.as_slice(),
			[ActivityEvent::ToolStarted { .. }, ActivityEvent::ToolCompleted { .. }]
		));
	}

	#[tokio::test]
	async fn tool_errors_become_result_text() {
		let spy = Arc::new(SpyTool {
			fail: true,
			..SpyTool::new()
		});
		let activity = Arc::new(RecordingActivity::default());
		let registry = registry_with(spy);

		let result = registry
			.dispatch(
				&ToolCall::new("call_1", "spy", "{}"),
				&FixedPermission::new(true),
				&context(activity.clone()),
			)
			.await;

		assert_eq!(result, "Tool error: Invalid arguments: bad input");
		assert!(matches!(
			activity.events.lock().unwrap().last(),
			Some(ActivityEvent::ToolFailed { .. })
		));
	}

	#[tokio::test]
	async fn generic_preview_truncates_arguments() {
		let registry = registry_with(Arc::new(SpyTool::new()));
		let permission = FixedPermission::new(false);
		let args = "a".repeat(500);

		registry
			.dispatch(
				&ToolCall::new("call_1", "spy", args),
				&permission,
				&context(Arc::new(RecordingActivity::default())),
			)
			.await;

		let asked = permission.asked.lock().unwrap();
		assert_eq!(asked[0].0, "spy");
		assert_eq!(asked[0].1, format!("spy({}...)", "a".repeat(PREVIEW_MAX_CHARS)));
	}

	#[tokio::test]
	async fn tool_preview_replaces_generic_one() {
		let registry = registry_with(Arc::new(SpyTool {
			preview: Some("Run command: ls".into()),
			..SpyTool::new()
		}));
		let permission = FixedPermission::new(false);

		registry
			.dispatch(
				&ToolCall::new("call_1", "spy", "{}"),
				&permission,
				&context(Arc::new(RecordingActivity::default())),
			)
			.await;

		assert_eq!(permission.asked.lock().unwrap()[0].1, "Run command: ls");
	}

	#[tokio::test]
	async fn auto_tier_skips_permission() {
		let registry = registry_with(Arc::new(MockTool { name: "auto".into() }));
		let permission = FixedPermission::new(false);

		let result = registry
			.dispatch(
				&ToolCall::new("call_1", "auto", "{}"),
				&permission,
				&context(Arc::new(RecordingActivity::default())),
			)
			.await;

		assert_eq!(result, "ok");
		assert!(permission.asked.lock().unwrap().is_empty());
	}
}
