// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Plain line-mode front end.

use std::sync::Arc;

use stormtrooper_agent::Agent;
use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::input::read_input;

const EXIT_COMMAND: &str = "/exit";

/// Reads requests line by line and runs each as one turn.
///
/// The input is shared with the line-prompt permission handler, which reads
/// its answers from the same stream while a turn is running.
pub struct Repl<R, W> {
	agent: Agent,
	input: Arc<Mutex<R>>,
	out: W,
}

impl<R, W> Repl<R, W>
where
	R: AsyncBufRead + Unpin + Send,
	W: AsyncWrite + Unpin + Send,
{
	pub fn new(agent: Agent, input: Arc<Mutex<R>>, out: W) -> Self {
		Self { agent, input, out }
	}

	/// Runs until `/exit`, end of input or cancellation.
	pub async fn run(&mut self, cancel: &CancellationToken) -> anyhow::Result<()> {
		info!(
			agent_id = %self.agent.id(),
			model = %self.agent.config().model_name,
			"line mode started"
		);
		self.out
			.write_all(
				format!(
					"Stormtrooper v{} - AI coding assistant\nType /exit or Ctrl+C to quit.\n\n",
					env!("CARGO_PKG_VERSION")
				)
				.as_bytes(),
			)
			.await?;

		loop {
			if cancel.is_cancelled() {
				break;
			}

			let read = {
				let mut input = self.input.lock().await;
				tokio::select! {
					biased;
					_ = cancel.cancelled() => break,
					read = read_input(&mut *input, &mut self.out) => read,
				}
			};

			let text = match read {
				Ok(Some(text)) => text,
				Ok(None) => break,
				Err(e) => {
					self.out
						.write_all(format!("Input error: {e}\n").as_bytes())
						.await?;
					continue;
				}
			};

			let text = text.trim();
			if text.is_empty() {
				continue;
			}
			if text == EXIT_COMMAND {
				break;
			}

			match self.agent.send(cancel, text).await {
				Ok(()) => self.out.write_all(b"\n").await?,
				Err(e) => {
					self.out.write_all(format!("\nError: {e}\n").as_bytes()).await?;
					if cancel.is_cancelled() {
						info!("turn cancelled, leaving line mode");
						break;
					}
				}
			}
		}

		self.out.write_all(b"Goodbye!\n").await?;
		self.out.flush().await?;
		Ok(())
	}

	#[cfg(test)]
	pub fn agent(&self) -> &Agent {
		&self.agent
	}
}
