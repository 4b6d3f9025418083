// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use stormtrooper_common_core::{strip_sentinel_tokens, DeltaHandler, StreamDelta, TokenSink};

/// Forwards the displayable part of each delta to a [`TokenSink`].
///
/// A delta carrying tool-call fragments is treated as a tool call in
/// progress and its content is withheld, since some providers echo argument
/// JSON as ordinary content. Sentinel tokens are removed from what remains.
pub struct VisibleTokenFilter {
	sink: Arc<dyn TokenSink>,
}

impl VisibleTokenFilter {
	pub fn new(sink: Arc<dyn TokenSink>) -> Self {
		Self { sink }
	}
}

#[async_trait]
impl DeltaHandler for VisibleTokenFilter {
	async fn on_delta(&mut self, delta: &StreamDelta) {
		if delta.has_tool_calls() {
			return;
		}
		let Some(content) = delta.content.as_deref().filter(|c| !c.is_empty()) else {
			return;
		};
		let visible = strip_sentinel_tokens(content);
		if !visible.is_empty() {
			self.sink.token(&visible).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::RecordingTokens;
	use stormtrooper_common_core::ToolCallFragment;

	#[tokio::test]
	async fn content_alongside_tool_fragments_is_suppressed() {
		let tokens = Arc::new(RecordingTokens::default());
		let mut filter = VisibleTokenFilter::new(tokens.clone());

		filter.on_delta(&StreamDelta::text("Checking. ")).await;
		filter
			.on_delta(&StreamDelta {
				content: Some("{\"file_path\":".into()),
				tool_calls: vec![ToolCallFragment {
					index: 0,
					arguments: Some("{\"file_path\":".into()),
					..Default::default()
				}],
				..Default::default()
			})
			.await;

		assert_eq!(tokens.text(), "Checking. ");
	}

	#[tokio::test]
	async fn sentinel_only_fragments_are_dropped() {
		let tokens = Arc::new(RecordingTokens::default());
		let mut filter = VisibleTokenFilter::new(tokens.clone());

		filter.on_delta(&StreamDelta::text("<|im_end|>")).await;
		filter.on_delta(&StreamDelta::text("ok<|tool_sep|>")).await;
		filter.on_delta(&StreamDelta::default()).await;

		assert_eq!(tokens.pieces(), vec!["ok".to_string()]);
	}
}
