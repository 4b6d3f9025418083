// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use futures::StreamExt;
use stormtrooper_common_core::{
	DeltaHandler, LlmClient, LlmError, LlmRequest, LlmResponse, Message, StreamDelta,
};
use tracing::{debug, instrument, warn};

use crate::accumulator::DeltaAccumulator;
use crate::stream::SseStream;
use crate::types::{OpenAIConfig, OpenAIRequest, OpenAIResponse};

/// Chat-completions client for OpenAI-compatible endpoints.
///
/// Transport failures and non-2xx responses are returned as-is; there is no
/// retry. Cancelling a call means dropping its future, which closes the
/// connection.
#[derive(Clone, Debug)]
pub struct OpenAIClient {
	config: OpenAIConfig,
	http: reqwest::Client,
}

impl OpenAIClient {
	pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
		let http = stormtrooper_common_http::build_client()
			.map_err(|e| LlmError::Http(format!("failed to build HTTP client: {e}")))?;
		Ok(Self::with_http_client(config, http))
	}

	pub fn with_http_client(config: OpenAIConfig, http: reqwest::Client) -> Self {
		Self { config, http }
	}

	async fn send(&self, request: &LlmRequest, stream: bool) -> Result<reqwest::Response, LlmError> {
		let body = OpenAIRequest::from_llm(request, stream);
		debug!(
			messages = body.messages.len(),
			tools = body.tools.len(),
			stream,
			"sending chat completion request"
		);

		let response = self
			.http
			.post(self.config.completions_url())
			.bearer_auth(&self.config.api_key)
			.header("HTTP-Referer", stormtrooper_common_http::REFERER)
			.json(&body)
			.send()
			.await
			.map_err(|e| LlmError::Http(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), body = %body, "chat completion request rejected");
			return Err(LlmError::Api {
				status: status.as_u16(),
				body,
			});
		}

		Ok(response)
	}
}

#[async_trait]
impl LlmClient for OpenAIClient {
	#[instrument(skip(self, request), fields(model = %request.model))]
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
		let response = self.send(&request, false).await?;
		let parsed: OpenAIResponse = response
			.json()
			.await
			.map_err(|e| LlmError::InvalidResponse(format!("failed to decode response: {e}")))?;

		let choice = parsed
			.choices
			.into_iter()
			.next()
			.ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

		Ok(LlmResponse {
			message: Message::from(choice.message),
			finish_reason: choice.finish_reason,
		})
	}

	#[instrument(skip(self, request, on_delta), fields(model = %request.model))]
	async fn complete_streaming(
		&self,
		request: LlmRequest,
		on_delta: &mut dyn DeltaHandler,
	) -> Result<Message, LlmError> {
		let response = self.send(&request, true).await?;
		let mut records = Box::pin(SseStream::new(response.bytes_stream()));
		let mut accumulator = DeltaAccumulator::new();
		let mut deltas = 0usize;

		while let Some(chunk) = records.next().await {
			let chunk = chunk.inspect_err(|e| warn!(error = %e, "stream aborted"))?;
			for choice in chunk.choices {
				let delta = StreamDelta::from(choice.delta);
				on_delta.on_delta(&delta).await;
				accumulator.push(&delta);
				deltas += 1;
			}
		}

		let message = accumulator.finish();
		debug!(
			deltas,
			content_len = message.content.len(),
			tool_calls = message.tool_calls.len(),
			"stream complete"
		);
		Ok(message)
	}
}
