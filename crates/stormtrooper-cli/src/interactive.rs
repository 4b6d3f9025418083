// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bridge-driven front end.
//!
//! One loop owns the only [`EventReceiver`] and waits on it alongside
//! operator input and Ctrl-C. Turns run in their own tasks, so the loop keeps
//! rendering tokens and answering permission prompts while a turn is busy.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use stormtrooper_agent::Agent;
use stormtrooper_bridge::{
	Bridge, BridgeEvent, ChatState, Display, EventReceiver, InputAction, TranscriptLine,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::input::PRIMARY_PROMPT;

/// How long to wait for a cancelled turn to report back before exiting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Writes display updates, tracking whether the cursor is mid-line.
struct Renderer<W> {
	out: W,
	mid_line: bool,
}

impl<W: Write> Renderer<W> {
	fn new(out: W) -> Self {
		Self {
			out,
			mid_line: false,
		}
	}

	fn render(&mut self, display: Option<Display>) {
		let result = match display {
			None => Ok(()),
			Some(Display::Token(text)) => {
				self.mid_line = !text.ends_with('\n');
				write!(self.out, "{text}")
			}
			Some(Display::Line(TranscriptLine::User(_))) => Ok(()),
			Some(Display::Line(line)) => {
				let text = match line {
					TranscriptLine::User(text)
					| TranscriptLine::Assistant(text)
					| TranscriptLine::Activity(text)
					| TranscriptLine::System(text) => text,
				};
				let lead = if self.mid_line { "\n" } else { "" };
				self.mid_line = text.ends_with(' ');
				if self.mid_line {
					write!(self.out, "{lead}{text}")
				} else {
					writeln!(self.out, "{lead}{text}")
				}
			}
		};
		if let Err(e) = result.and_then(|_| self.out.flush()) {
			warn!(error = %e, "failed to write to terminal");
		}
	}

	fn end_turn(&mut self) {
		let lead = if self.mid_line { "\n" } else { "" };
		self.mid_line = true;
		if let Err(e) = write!(self.out, "{lead}{PRIMARY_PROMPT}").and_then(|_| self.out.flush()) {
			warn!(error = %e, "failed to write to terminal");
		}
	}
}

/// Runs the interactive session until `/exit`, end of input or Ctrl-C.
pub async fn run<R, W>(bridge: Bridge, agent: Agent, input: R, out: W) -> anyhow::Result<()>
where
	R: AsyncBufRead + Unpin,
	W: Write,
{
	let mut events = bridge.take_events()?;
	debug!(
		agent_id = %agent.id(),
		model = %agent.config().model_name,
		"interactive session started"
	);
	let agent = Arc::new(Mutex::new(agent));
	let mut chat = ChatState::new();
	let mut renderer = Renderer::new(out);
	let mut lines = input.lines();
	let mut cancel = CancellationToken::new();

	renderer.render(Some(Display::Line(TranscriptLine::System(format!(
		"Stormtrooper v{} - AI coding assistant\nType /exit or Ctrl+C to quit.\n",
		env!("CARGO_PKG_VERSION")
	)))));
	renderer.end_turn();

	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	loop {
		tokio::select! {
			event = events.next() => {
				let Some(event) = event else {
					debug!("event stream closed");
					break;
				};
				let finished = matches!(event, BridgeEvent::TurnFinished { .. });
				renderer.render(chat.apply(event));
				if finished {
					renderer.end_turn();
				}
			}
			line = lines.next_line() => {
				let line = match line {
					Ok(Some(line)) => line,
					Ok(None) => {
						debug!("input closed");
						break;
					}
					Err(e) => {
						warn!(error = %e, "failed to read input");
						break;
					}
				};
				renderer.mid_line = false;
				let (action, display) = chat.submit(&line);
				renderer.render(display);
				match action {
					InputAction::StartTurn(text) => {
						cancel = CancellationToken::new();
						if let Err(e) = bridge.start_turn(agent.clone(), text, cancel.clone()) {
							renderer.render(Some(Display::Line(TranscriptLine::System(format!(
								"Error: {e}"
							)))));
						}
					}
					InputAction::Quit => break,
					InputAction::Ignored if !chat.is_busy() => renderer.end_turn(),
					_ => {}
				}
			}
			_ = &mut ctrl_c => {
				debug!("interrupted");
				break;
			}
		}
	}

	cancel.cancel();
	renderer.render(chat.quit());
	drain_until_finished(&mut chat, &mut events).await;
	renderer.render(Some(Display::Line(TranscriptLine::System(
		"Goodbye!".to_string(),
	))));
	Ok(())
}

/// Waits for an outstanding turn to report its end, denying any approval
/// request that arrives meanwhile.
async fn drain_until_finished(chat: &mut ChatState, events: &mut EventReceiver) {
	if !chat.is_busy() {
		return;
	}
	let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
		while let Some(event) = events.next().await {
			let finished = matches!(event, BridgeEvent::TurnFinished { .. });
			chat.apply(event);
			chat.quit();
			if finished {
				break;
			}
		}
	})
	.await;
	if drained.is_err() {
		warn!("turn did not finish after cancellation");
	}
}
