// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reassembles streamed deltas into one assistant message.

use std::collections::BTreeMap;

use stormtrooper_common_core::{strip_sentinel_tokens, Message, Role, StreamDelta, ToolCall};

/// Folds [`StreamDelta`]s into a complete assistant [`Message`].
///
/// Tool calls are keyed by fragment index. The first fragment seen for an
/// index fixes its slot; later fragments overwrite a non-empty id or type and
/// append name and argument text. [`DeltaAccumulator::finish`] emits calls in
/// ascending index order, skipping unused indices, so arrival order never
/// affects the final list.
///
/// When the finished message carries tool calls, the content is cleaned:
/// sentinel tokens are removed, surrounding whitespace is trimmed, and content
/// that is only leaked tool-call JSON (`{...}` or `name{...}`) is dropped.
/// Text-only messages are returned verbatim.
#[derive(Debug, Default)]
pub struct DeltaAccumulator {
	role: Option<String>,
	content: String,
	tool_calls: BTreeMap<usize, ToolCall>,
}

impl DeltaAccumulator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, delta: &StreamDelta) {
		if let Some(role) = delta.role.as_deref().filter(|r| !r.is_empty()) {
			self.role = Some(role.to_string());
		}

		if let Some(content) = &delta.content {
			self.content.push_str(content);
		}

		for fragment in &delta.tool_calls {
			let name = fragment.name.as_deref().unwrap_or_default();
			let arguments = fragment.arguments.as_deref().unwrap_or_default();

			match self.tool_calls.get_mut(&fragment.index) {
				None => {
					self.tool_calls.insert(
						fragment.index,
						ToolCall {
							id: fragment.id.clone().unwrap_or_default(),
							call_type: fragment.call_type.clone().unwrap_or_default(),
							name: name.to_string(),
							arguments: arguments.to_string(),
						},
					);
				}
				Some(existing) => {
					if let Some(id) = fragment.id.as_deref().filter(|id| !id.is_empty()) {
						existing.id = id.to_string();
					}
					if let Some(kind) = fragment.call_type.as_deref().filter(|t| !t.is_empty()) {
						existing.call_type = kind.to_string();
					}
					existing.name.push_str(name);
					existing.arguments.push_str(arguments);
				}
			}
		}
	}

	/// Content accumulated so far, before any finalization cleaning.
	pub fn content(&self) -> &str {
		&self.content
	}

	pub fn finish(self) -> Message {
		let role = self
			.role
			.as_deref()
			.and_then(Role::parse)
			.unwrap_or(Role::Assistant);

		let tool_calls: Vec<ToolCall> = self
			.tool_calls
			.into_values()
			.map(|mut call| {
				if call.call_type.is_empty() {
					call.call_type = "function".to_string();
				}
				call
			})
			.collect();

		let content = if tool_calls.is_empty() {
			self.content
		} else {
			clean_tool_call_content(&self.content)
		};

		Message {
			role,
			content,
			tool_calls,
			..Default::default()
		}
	}
}

fn clean_tool_call_content(content: &str) -> String {
	let cleaned = strip_sentinel_tokens(content);
	let cleaned = cleaned.trim();
	if looks_like_tool_call_json(cleaned) {
		String::new()
	} else {
		cleaned.to_string()
	}
}

/// Matches `{...}` and `name{...}` where `name` is a bare identifier.
fn looks_like_tool_call_json(text: &str) -> bool {
	if !text.ends_with('}') {
		return false;
	}
	match text.find('{') {
		Some(0) => true,
		Some(idx) => text[..idx]
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')),
		None => false,
	}
}
