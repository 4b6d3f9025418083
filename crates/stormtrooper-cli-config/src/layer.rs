// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layers and the resolved configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_MODEL: &str = "moonshotai/kimi-k2";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Compact,
	Pretty,
	Json,
}

impl fmt::Display for LogFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LogFormat::Compact => write!(f, "compact"),
			LogFormat::Pretty => write!(f, "pretty"),
			LogFormat::Json => write!(f, "json"),
		}
	}
}

impl FromStr for LogFormat {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"compact" => Ok(LogFormat::Compact),
			"pretty" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			_ => Err(ConfigError::invalid_value(
				"logging.format",
				format!("unknown format '{s}', expected 'compact', 'pretty', or 'json'"),
			)),
		}
	}
}

/// Logging section of a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfigLayer {
	pub level: Option<String>,
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: LoggingConfigLayer) {
		if let Some(level) = non_empty(other.level) {
			self.level = Some(level);
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

/// One source's view of the configuration. Every field is optional so
/// layers can be stacked; empty strings count as unset.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigLayer {
	pub api_key: Option<String>,
	pub model: Option<String>,
	pub base_url: Option<String>,
	#[serde(default)]
	pub logging: LoggingConfigLayer,
}

impl fmt::Debug for ConfigLayer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConfigLayer")
			.field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
			.field("model", &self.model)
			.field("base_url", &self.base_url)
			.field("logging", &self.logging)
			.finish()
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

impl ConfigLayer {
	/// Merges another layer on top of this one.
	/// Values from `other` take precedence when present and non-empty.
	pub fn merge(&mut self, other: ConfigLayer) {
		if let Some(api_key) = non_empty(other.api_key) {
			self.api_key = Some(api_key);
		}
		if let Some(model) = non_empty(other.model) {
			self.model = Some(model);
		}
		if let Some(base_url) = non_empty(other.base_url) {
			self.base_url = Some(base_url);
		}
		self.logging.merge(other.logging);
	}

	/// Resolves the merged layer, filling defaults and requiring an API key.
	pub fn finalize(self) -> Result<StormtrooperConfig, ConfigError> {
		let api_key = non_empty(self.api_key).ok_or(ConfigError::MissingApiKey)?;
		Ok(StormtrooperConfig {
			api_key,
			model: non_empty(self.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
			base_url: non_empty(self.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
			logging: LoggingConfig {
				level: non_empty(self.logging.level).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
				format: self.logging.format.unwrap_or_default(),
			},
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
	pub level: String,
	pub format: LogFormat,
}

/// Fully resolved configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct StormtrooperConfig {
	pub api_key: String,
	pub model: String,
	pub base_url: String,
	pub logging: LoggingConfig,
}

impl fmt::Debug for StormtrooperConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StormtrooperConfig")
			.field("api_key", &"[REDACTED]")
			.field("model", &self.model)
			.field("base_url", &self.base_url)
			.field("logging", &self.logging)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn layer(api_key: Option<&str>, model: Option<&str>) -> ConfigLayer {
		ConfigLayer {
			api_key: api_key.map(String::from),
			model: model.map(String::from),
			..Default::default()
		}
	}

	#[test]
	fn later_layers_win() {
		let mut merged = layer(Some("global"), Some("a"));
		merged.merge(layer(None, Some("b")));
		merged.merge(layer(Some("env"), None));

		assert_eq!(merged.api_key.as_deref(), Some("env"));
		assert_eq!(merged.model.as_deref(), Some("b"));
	}

	#[test]
	fn empty_strings_do_not_override() {
		let mut merged = layer(Some("key"), Some("model"));
		merged.merge(layer(Some(""), Some("  ")));

		assert_eq!(merged.api_key.as_deref(), Some("key"));
		assert_eq!(merged.model.as_deref(), Some("model"));
	}

	#[test]
	fn finalize_fills_defaults() {
		let config = layer(Some("key"), None).finalize().unwrap();

		assert_eq!(config.model, DEFAULT_MODEL);
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.logging.level, "info");
		assert_eq!(config.logging.format, LogFormat::Compact);
	}

	#[test]
	fn finalize_requires_api_key() {
		let err = layer(None, Some("m")).finalize().unwrap_err();
		assert!(matches!(err, ConfigError::MissingApiKey));
		assert!(err.to_string().contains("OPENROUTER_API_KEY"));
	}

	#[test]
	fn debug_redacts_api_key() {
		let config = layer(Some("sk-secret"), None).finalize().unwrap();
		assert!(!format!("{config:?}").contains("sk-secret"));
		assert!(!format!("{:?}", layer(Some("sk-secret"), None)).contains("sk-secret"));
	}

	#[test]
	fn log_format_parses_case_insensitively() {
		assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
		assert!("xml".parse::<LogFormat>().is_err());
	}

	proptest! {
		/// Merging a layer whose fields are all unset never changes anything.
		#[test]
		fn merging_empty_layer_is_identity(
			api_key in proptest::option::of("[a-z]{1,10}"),
			model in proptest::option::of("[a-z/]{1,10}"),
		) {
			let original = layer(api_key.as_deref(), model.as_deref());
			let mut merged = original.clone();
			merged.merge(ConfigLayer::default());
			prop_assert_eq!(merged, original);
		}
	}
}
