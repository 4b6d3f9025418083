// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use stormtrooper_common_core::PermissionHandler;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Asks for approval on a text stream and reads the answer from a line.
///
/// The reader is shared behind a mutex so a line-mode front end can keep
/// using the same input between prompts. Prompts from concurrent callers are
/// serialized. Only an answer starting with `y` or `Y` allows; end of input
/// or a read error denies.
pub struct LinePromptPermission<R, W> {
	input: Arc<Mutex<R>>,
	output: Mutex<W>,
}

impl<R, W> LinePromptPermission<R, W> {
	pub fn new(input: Arc<Mutex<R>>, output: W) -> Self {
		Self {
			input,
			output: Mutex::new(output),
		}
	}
}

#[async_trait]
impl<R, W> PermissionHandler for LinePromptPermission<R, W>
where
	R: AsyncBufRead + Unpin + Send,
	W: AsyncWrite + Unpin + Send,
{
	async fn check(&self, tool_name: &str, preview: &str) -> bool {
		let mut output = self.output.lock().await;
		let prompt = format!("\n[permission] {tool_name}\n{preview}\n[y/n]: ");
		if let Err(e) = output.write_all(prompt.as_bytes()).await {
			warn!(error = %e, "failed to write permission prompt");
			return false;
		}
		if let Err(e) = output.flush().await {
			warn!(error = %e, "failed to flush permission prompt");
		}

		let mut line = String::new();
		let read = self.input.lock().await.read_line(&mut line).await;
		let allowed = match read {
			Ok(0) => false,
			Ok(_) => line.trim_start().starts_with(['y', 'Y']),
			Err(e) => {
				warn!(error = %e, "failed to read permission answer");
				false
			}
		};

		debug!(tool_name, allowed, "permission decided");
		allowed
	}
}
