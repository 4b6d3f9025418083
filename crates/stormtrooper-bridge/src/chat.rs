// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Front-end view model fed by bridge events and operator input.

use std::collections::VecDeque;

use tracing::debug;

use crate::event::{BridgeEvent, PermissionRequest, ToolOutcome};

const EXIT_COMMAND: &str = "/exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptLine {
	User(String),
	Assistant(String),
	Activity(String),
	System(String),
}

/// What the renderer should show after an update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Display {
	/// Text appended to the current assistant block.
	Token(String),
	Line(TranscriptLine),
}

/// What the caller should do with a line of operator input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
	/// Start a turn with this text.
	StartTurn(String),
	/// A pending permission request was answered.
	Answered(bool),
	/// A turn is already running; nothing was submitted.
	Busy,
	Ignored,
	Quit,
}

/// Transcript, busy flag and pending approvals of one interactive session.
#[derive(Debug, Default)]
pub struct ChatState {
	transcript: Vec<TranscriptLine>,
	busy: bool,
	assistant_open: bool,
	pending: VecDeque<PermissionRequest>,
}

impl ChatState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn transcript(&self) -> &[TranscriptLine] {
		&self.transcript
	}

	pub fn is_busy(&self) -> bool {
		self.busy
	}

	/// The approval request the next input line will answer.
	pub fn pending_permission(&self) -> Option<&PermissionRequest> {
		self.pending.front()
	}

	fn push(&mut self, line: TranscriptLine) -> Display {
		self.assistant_open = false;
		self.transcript.push(line.clone());
		Display::Line(line)
	}

	/// Handles one line typed by the operator.
	pub fn submit(&mut self, input: &str) -> (InputAction, Option<Display>) {
		let text = input.trim();

		if text == EXIT_COMMAND {
			return (InputAction::Quit, self.quit());
		}

		if let Some(request) = self.pending.pop_front() {
			let allowed = matches!(text.to_ascii_lowercase().as_str(), "y" | "yes");
			debug!(request_id = %request.id, allowed, "answering permission request");
			let line = TranscriptLine::Activity(format!(
				"[permission] {} {}",
				request.tool_name,
				if allowed { "allowed" } else { "denied" }
			));
			request.responder.respond(allowed);
			return (InputAction::Answered(allowed), Some(self.push(line)));
		}

		if text.is_empty() {
			return (InputAction::Ignored, None);
		}

		if self.busy {
			let line = TranscriptLine::System(
				"A request is still running. Wait for it to finish, or press Ctrl-C to quit."
					.to_string(),
			);
			return (InputAction::Busy, Some(self.push(line)));
		}

		self.busy = true;
		let display = self.push(TranscriptLine::User(text.to_string()));
		(InputAction::StartTurn(text.to_string()), Some(display))
	}

	/// Denies every outstanding approval request.
	///
	/// Call before exiting so no turn stays blocked on an answer.
	pub fn quit(&mut self) -> Option<Display> {
		if self.pending.is_empty() {
			return None;
		}
		while let Some(request) = self.pending.pop_front() {
			debug!(request_id = %request.id, "denying permission request on quit");
			request.responder.deny();
		}
		Some(self.push(TranscriptLine::System(
			"Pending permission requests denied.".to_string(),
		)))
	}

	/// Applies one bridge event.
	pub fn apply(&mut self, event: BridgeEvent) -> Option<Display> {
		match event {
			BridgeEvent::TurnStarted => {
				self.busy = true;
				None
			}
			BridgeEvent::Token(text) => {
				if self.assistant_open {
					if let Some(TranscriptLine::Assistant(block)) = self.transcript.last_mut() {
						block.push_str(&text);
						return Some(Display::Token(text));
					}
				}
				self.transcript.push(TranscriptLine::Assistant(text.clone()));
				self.assistant_open = true;
				Some(Display::Token(text))
			}
			BridgeEvent::ToolStarted { name, args, .. } => {
				Some(self.push(TranscriptLine::Activity(format!("[tool] {name}({args})"))))
			}
			BridgeEvent::ToolFinished { name, outcome, .. } => {
				let line = match outcome {
					ToolOutcome::Completed(result) => format!("[tool:done] {name}: {result}"),
					ToolOutcome::Failed(error) => format!("[tool:error] {name}: {error}"),
					ToolOutcome::Denied => format!("[tool:denied] {name}"),
					ToolOutcome::Unknown => format!("[tool:unknown] {name}"),
				};
				Some(self.push(TranscriptLine::Activity(line)))
			}
			BridgeEvent::PermissionRequested(request) => {
				let line = TranscriptLine::Activity(format!(
					"[permission] {}\n{}\n[y/n]: ",
					request.tool_name, request.preview
				));
				self.pending.push_back(request);
				Some(self.push(line))
			}
			BridgeEvent::SubAgentSpawned { task } => Some(self.push(TranscriptLine::Activity(
				format!("[agent] Spawning sub-agent: {task}"),
			))),
			BridgeEvent::SubAgentFinished => Some(self.push(TranscriptLine::Activity(
				"[agent] Sub-agent finished".to_string(),
			))),
			BridgeEvent::TurnFinished { error } => {
				self.busy = false;
				self.assistant_open = false;
				error.map(|e| self.push(TranscriptLine::System(format!("Error: {e}"))))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event::PermissionResponder;
	use tokio::sync::oneshot;

	fn request(tool: &str) -> (PermissionRequest, oneshot::Receiver<bool>) {
		let (tx, rx) = oneshot::channel();
		(
			PermissionRequest {
				id: format!("perm-{tool}"),
				tool_name: tool.to_string(),
				preview: format!("preview {tool}"),
				responder: PermissionResponder::new(tx),
			},
			rx,
		)
	}

	#[test]
	fn submit_starts_turn_and_rejects_while_busy() {
		let mut chat = ChatState::new();

		let (action, _) = chat.submit("  list files  ");
		assert_eq!(action, InputAction::StartTurn("list files".to_string()));
		assert!(chat.is_busy());

		let (action, display) = chat.submit("another");
		assert_eq!(action, InputAction::Busy);
		let Some(Display::Line(TranscriptLine::System(notice))) = display else {
			panic!("expected a system notice, got {display:?}");
		};
		assert!(notice.ends_with("press Ctrl-C to quit."));

		chat.apply(BridgeEvent::TurnFinished { error: None });
		assert!(!chat.is_busy());
		assert_eq!(chat.submit("").0, InputAction::Ignored);
	}

	#[test]
	fn tokens_join_one_block_until_activity() {
		let mut chat = ChatState::new();
		chat.submit("go");
		chat.apply(BridgeEvent::Token("Hel".into()));
		chat.apply(BridgeEvent::Token("lo".into()));
		chat.apply(BridgeEvent::ToolStarted {
			id: "1".into(),
			name: "glob".into(),
			args: "{}".into(),
		});
		chat.apply(BridgeEvent::Token("Done".into()));

		assert_eq!(
			chat.transcript(),
			&[
				TranscriptLine::User("go".into()),
				TranscriptLine::Assistant("Hello".into()),
				TranscriptLine::Activity("[tool] glob({})".into()),
				TranscriptLine::Assistant("Done".into()),
			]
		);
	}

	#[tokio::test]
	async fn next_line_answers_pending_permission() {
		let mut chat = ChatState::new();
		chat.submit("write it");
		let (req, rx) = request("write_file");
		chat.apply(BridgeEvent::PermissionRequested(req));
		assert_eq!(chat.pending_permission().unwrap().tool_name, "write_file");

		let (action, _) = chat.submit("Yes");
		assert_eq!(action, InputAction::Answered(true));
		assert!(rx.await.unwrap());
		assert!(chat.pending_permission().is_none());
	}

	#[tokio::test]
	async fn other_answers_deny() {
		let mut chat = ChatState::new();
		let (req, rx) = request("shell_exec");
		chat.apply(BridgeEvent::PermissionRequested(req));

		assert_eq!(chat.submit("sure").0, InputAction::Answered(false));
		assert!(!rx.await.unwrap());
	}

	/// Tests that quitting resolves every outstanding request with a deny.
	#[tokio::test]
	async fn quit_denies_pending_requests() {
		let mut chat = ChatState::new();
		let (first, first_rx) = request("a");
		let (second, second_rx) = request("b");
		chat.apply(BridgeEvent::PermissionRequested(first));
		chat.apply(BridgeEvent::PermissionRequested(second));

		assert_eq!(chat.submit("/exit").0, InputAction::Quit);
		assert!(!first_rx.await.unwrap());
		assert!(!second_rx.await.unwrap());
	}

	#[test]
	fn turn_error_is_shown_once() {
		let mut chat = ChatState::new();
		chat.submit("go");
		let display = chat.apply(BridgeEvent::TurnFinished {
			error: Some("LLM error: boom".into()),
		});

		assert_eq!(
			display,
			Some(Display::Line(TranscriptLine::System(
				"Error: LLM error: boom".into()
			)))
		);
		let errors = chat
			.transcript()
			.iter()
			.filter(|l| matches!(l, TranscriptLine::System(_)))
			.count();
		assert_eq!(errors, 1);
	}
}
