// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: TOML files, environment variables and CLI flags.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::{ConfigLayer, LogFormat, LoggingConfigLayer};

pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
pub const ENV_MODEL: &str = "STORMTROOPER_MODEL";
pub const ENV_BASE_URL: &str = "STORMTROOPER_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "STORMTROOPER_LOG_LEVEL";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	GlobalFile = 20,
	ProjectFile = 30,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
///
/// Compiled defaults are applied when the merged layer is finalized; this
/// source only carries front-end specific defaults such as a quieter log
/// level.
#[derive(Default)]
pub struct DefaultsSource {
	layer: ConfigLayer,
}

impl DefaultsSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_layer(layer: ConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(self.layer.clone())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
}

impl FileSource {
	pub fn global(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::GlobalFile,
		}
	}

	pub fn project(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::ProjectFile,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		match self.precedence {
			Precedence::GlobalFile => "global-file",
			_ => "project-file",
		}
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Reads the process environment unless built with [`EnvSource::with_vars`].
#[derive(Default)]
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_vars(vars: HashMap<String, String>) -> Self {
		Self { vars: Some(vars) }
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|v| !v.is_empty())
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ConfigLayer {
			api_key: self.var(ENV_API_KEY),
			model: self.var(ENV_MODEL),
			base_url: self.var(ENV_BASE_URL),
			logging: LoggingConfigLayer {
				level: self.var(ENV_LOG_LEVEL),
				format: None,
			},
		})
	}
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub model: Option<String>,
	pub base_url: Option<String>,
	pub log_level: Option<String>,
	pub json_logs: bool,
}

pub struct CliSource {
	overrides: CliOverrides,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("applying command line overrides");
		Ok(ConfigLayer {
			api_key: None,
			model: self.overrides.model.clone(),
			base_url: self.overrides.base_url.clone(),
			logging: LoggingConfigLayer {
				level: self.overrides.log_level.clone(),
				format: self.overrides.json_logs.then_some(LogFormat::Json),
			},
		})
	}
}
