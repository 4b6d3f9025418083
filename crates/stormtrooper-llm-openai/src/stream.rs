// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-sent event framing for streamed chat completions.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project_lite::pin_project;
use stormtrooper_common_core::LlmError;
use tracing::{debug, trace};

use crate::types::OpenAIStreamChunk;

const DONE_MARKER: &str = "[DONE]";

pin_project! {
		/// Stream adapter that splits a byte stream into `data:` records and
		/// decodes each record into an [`OpenAIStreamChunk`].
		///
		/// The stream ends after the `[DONE]` record, at end of input, or right
		/// after yielding the first error.
		pub struct SseStream<S> {
				#[pin]
				inner: S,
				buffer: Vec<u8>,
				finished: bool,
				exhausted: bool,
		}
}

impl<S> SseStream<S> {
	pub fn new(inner: S) -> Self {
		Self {
			inner,
			buffer: Vec::new(),
			finished: false,
			exhausted: false,
		}
	}
}

enum Record {
	Chunk(OpenAIStreamChunk),
	Done,
}

/// Interprets one line. `Ok(None)` means the line carries no record.
fn parse_line(raw: &[u8]) -> Result<Option<Record>, LlmError> {
	let line = std::str::from_utf8(raw)
		.map_err(|e| LlmError::InvalidResponse(format!("Invalid UTF-8: {e}")))?;
	let line = line.trim_end_matches('\r');

	if line.is_empty() || line.starts_with(':') {
		return Ok(None);
	}

	let Some(data) = line.strip_prefix("data:") else {
		trace!(line, "ignoring non-data SSE line");
		return Ok(None);
	};
	let data = data.strip_prefix(' ').unwrap_or(data);

	if data.trim() == DONE_MARKER {
		debug!("Received [DONE] marker");
		return Ok(Some(Record::Done));
	}

	serde_json::from_str::<OpenAIStreamChunk>(data)
		.map(|chunk| Some(Record::Chunk(chunk)))
		.map_err(|e| LlmError::Stream(e.to_string()))
}

impl<S, E> Stream for SseStream<S>
where
	S: Stream<Item = Result<bytes::Bytes, E>>,
	E: std::fmt::Display,
{
	type Item = Result<OpenAIStreamChunk, LlmError>;

	fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		let mut this = self.project();

		loop {
			if *this.finished {
				return Poll::Ready(None);
			}

			if let Some(pos) = this.buffer.iter().position(|b| *b == b'\n') {
				let line: Vec<u8> = this.buffer.drain(..=pos).collect();
				match parse_line(&line[..pos]) {
					Ok(None) => continue,
					Ok(Some(Record::Done)) => {
						*this.finished = true;
						return Poll::Ready(None);
					}
					Ok(Some(Record::Chunk(chunk))) => return Poll::Ready(Some(Ok(chunk))),
					Err(e) => {
						*this.finished = true;
						return Poll::Ready(Some(Err(e)));
					}
				}
			}

			if *this.exhausted {
				// Final record without a trailing newline.
				*this.finished = true;
				let rest = std::mem::take(this.buffer);
				return match parse_line(&rest) {
					Ok(Some(Record::Chunk(chunk))) => Poll::Ready(Some(Ok(chunk))),
					Ok(_) => Poll::Ready(None),
					Err(e) => Poll::Ready(Some(Err(e))),
				};
			}

			match this.inner.as_mut().poll_next(cx) {
				Poll::Ready(Some(Ok(bytes))) => {
					trace!(bytes_len = bytes.len(), "Received SSE data chunk");
					this.buffer.extend_from_slice(&bytes);
				}
				Poll::Ready(Some(Err(e))) => {
					*this.finished = true;
					return Poll::Ready(Some(Err(LlmError::Http(e.to_string()))));
				}
				Poll::Ready(None) => *this.exhausted = true,
				Poll::Pending => return Poll::Pending,
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use futures::StreamExt;

	fn chunks(parts: &[&str]) -> Vec<Result<bytes::Bytes, std::io::Error>> {
		parts
			.iter()
			.map(|p| Ok(bytes::Bytes::from(p.to_string())))
			.collect()
	}

	async fn collect(parts: &[&str]) -> Vec<Result<OpenAIStreamChunk, LlmError>> {
		SseStream::new(futures::stream::iter(chunks(parts)))
			.collect()
			.await
	}

	/// Tests that records split across network reads are reassembled before
	/// decoding. Transport chunk boundaries carry no meaning in SSE.
	#[tokio::test]
	async fn test_records_split_across_reads() {
		let items = collect(&[
			"data: {\"id\":\"1\",\"choices\":[{\"index\":0,\"delta\":{\"con",
			"tent\":\"Hel\"}}]}\n\ndata: {\"id\":\"1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n",
			"\ndata: [DONE]\n\n",
		])
		.await;

		assert_eq!(items.len(), 2);
		let first = items[0].as_ref().unwrap();
		assert_eq!(first.choices[0].delta.content.as_deref(), Some("Hel"));
		let second = items[1].as_ref().unwrap();
		assert_eq!(second.choices[0].delta.content.as_deref(), Some("lo"));
	}

	/// Tests that nothing after the [DONE] marker is decoded, even garbage.
	#[tokio::test]
	async fn test_done_marker_ends_stream() {
		let items = collect(&["data: [DONE]\n\ndata: not json\n\n"]).await;
		assert!(items.is_empty());
	}

	/// Tests that comments, event-name lines and blank lines are skipped.
	#[tokio::test]
	async fn test_non_data_lines_are_ignored() {
		let items = collect(&[
			": OPENROUTER PROCESSING\n\nevent: message\nretry: 10\ndata: {\"choices\":[]}\r\n\r\ndata: [DONE]\n",
		])
		.await;
		assert_eq!(items.len(), 1);
		assert!(items[0].as_ref().unwrap().choices.is_empty());
	}

	/// Tests that an undecodable record aborts the stream with a decode error
	/// and that no later record is surfaced.
	#[tokio::test]
	async fn test_malformed_record_aborts() {
		let items = collect(&[
			"data: {\"choices\":[]}\n\n",
			"data: {broken\n\n",
			"data: {\"choices\":[]}\n\n",
		])
		.await;

		assert_eq!(items.len(), 2);
		assert!(items[0].is_ok());
		let err = items[1].as_ref().unwrap_err();
		assert!(matches!(err, LlmError::Stream(_)));
		assert!(err.to_string().contains("failed to parse SSE chunk"));
	}

	/// Tests that a multi-byte character split across reads survives, since
	/// lines are decoded only once complete.
	#[tokio::test]
	async fn test_utf8_split_across_reads() {
		let record = "data: {\"choices\":[{\"delta\":{\"content\":\"caf\u{e9}\"}}]}\n";
		let bytes = record.as_bytes();
		let split = record.find('\u{e9}').unwrap() + 1;
		let parts: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
			Ok(bytes::Bytes::copy_from_slice(&bytes[..split])),
			Ok(bytes::Bytes::copy_from_slice(&bytes[split..])),
		];

		let items: Vec<_> = SseStream::new(futures::stream::iter(parts)).collect().await;
		assert_eq!(items.len(), 1);
		assert_eq!(
			items[0].as_ref().unwrap().choices[0].delta.content.as_deref(),
			Some("caf\u{e9}")
		);
	}

	/// Tests that a final record without a trailing newline is still decoded
	/// when the body ends without a [DONE] marker.
	#[tokio::test]
	async fn test_unterminated_final_record() {
		let items = collect(&["data: {\"choices\":[]}"]).await;
		assert_eq!(items.len(), 1);
		assert!(items[0].is_ok());
	}

	/// Tests that transport failures surface as HTTP errors.
	#[tokio::test]
	async fn test_transport_error_surfaces() {
		let parts: Vec<Result<bytes::Bytes, std::io::Error>> = vec![Err(std::io::Error::new(
			std::io::ErrorKind::ConnectionReset,
			"reset",
		))];
		let items: Vec<_> = SseStream::new(futures::stream::iter(parts)).collect().await;
		assert!(matches!(items.as_slice(), [Err(LlmError::Http(_))]));
	}
}
