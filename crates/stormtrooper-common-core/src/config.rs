// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "moonshotai/kimi-k2";

/// Configuration for one orchestrator instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
	pub model_name: String,
	pub workspace_root: PathBuf,
	pub max_tokens: Option<u32>,
	pub temperature: Option<f32>,
}

impl AgentConfig {
	pub fn new(model_name: impl Into<String>, workspace_root: impl Into<PathBuf>) -> Self {
		Self {
			model_name: model_name.into(),
			workspace_root: workspace_root.into(),
			..Default::default()
		}
	}
}

impl Default for AgentConfig {
	fn default() -> Self {
		Self {
			model_name: DEFAULT_MODEL.to_string(),
			workspace_root: PathBuf::from("."),
			max_tokens: None,
			temperature: None,
		}
	}
}
