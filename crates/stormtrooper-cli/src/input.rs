// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub const PRIMARY_PROMPT: &str = "> ";
pub const CONTINUATION_PROMPT: &str = ". ";

/// Reads one logical input. A line ending in `\` continues on the next line.
///
/// Returns `None` once the input is closed.
pub async fn read_input<R, W>(input: &mut R, prompt_out: &mut W) -> io::Result<Option<String>>
where
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut lines = Vec::new();
	let mut prompt = PRIMARY_PROMPT;

	loop {
		prompt_out.write_all(prompt.as_bytes()).await?;
		prompt_out.flush().await?;
		prompt = CONTINUATION_PROMPT;

		let mut line = String::new();
		if input.read_line(&mut line).await? == 0 {
			return Ok(None);
		}
		let line = line.trim_end_matches(['\n', '\r']);

		match line.strip_suffix('\\') {
			Some(continued) => lines.push(continued.to_string()),
			None => {
				lines.push(line.to_string());
				return Ok(Some(lines.join("\n")));
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tokio::io::BufReader;

	async fn read_all(text: &str) -> (Vec<String>, String) {
		let mut input = BufReader::new(text.as_bytes());
		let mut prompts = Vec::new();
		let mut inputs = Vec::new();
		while let Some(value) = read_input(&mut input, &mut prompts).await.unwrap() {
			inputs.push(value);
		}
		(inputs, String::from_utf8(prompts).unwrap())
	}

	#[tokio::test]
	async fn reads_single_lines() {
		let (inputs, prompts) = read_all("hello\r\nworld\n").await;
		assert_eq!(inputs, vec!["hello", "world"]);
		assert_eq!(prompts, "> > > ");
	}

	#[tokio::test]
	async fn backslash_continues_input() {
		let (inputs, prompts) = read_all("first \\\nsecond\nthird\n").await;
		assert_eq!(inputs, vec!["first \nsecond", "third"]);
		assert_eq!(prompts, "> . > > ");
	}

	#[tokio::test]
	async fn last_line_without_newline_is_read() {
		let (inputs, _) = read_all("no newline").await;
		assert_eq!(inputs, vec!["no newline"]);
	}
}
