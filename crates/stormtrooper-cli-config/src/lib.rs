// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for Stormtrooper.
//!
//! Layers, lowest to highest precedence: compiled defaults, the global file
//! `~/.stormtrooper/config.toml`, the project file
//! `./.stormtrooper/config.toml`, environment variables and CLI flags.

pub mod error;
pub mod layer;
pub mod paths;
pub mod registry;
pub mod sources;

use std::path::Path;

pub use error::ConfigError;
pub use layer::{
	ConfigLayer, LogFormat, LoggingConfig, LoggingConfigLayer, StormtrooperConfig, DEFAULT_BASE_URL,
	DEFAULT_MODEL,
};
pub use registry::ConfigRegistry;
pub use sources::{CliOverrides, ConfigSource, Precedence};

/// Load configuration for a project rooted at `project_root`.
pub fn load_config(
	project_root: &Path,
	cli: CliOverrides,
) -> Result<StormtrooperConfig, ConfigError> {
	load_config_with_defaults(project_root, ConfigLayer::default(), cli)
}

/// Load configuration, starting from `defaults` instead of an empty layer.
pub fn load_config_with_defaults(
	project_root: &Path,
	defaults: ConfigLayer,
	cli: CliOverrides,
) -> Result<StormtrooperConfig, ConfigError> {
	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(sources::DefaultsSource::with_layer(defaults)));
	match paths::global_config_path() {
		Ok(path) => registry.register(Box::new(sources::FileSource::global(path))),
		Err(e) => tracing::warn!(error = %e, "skipping global config file"),
	}
	registry.register(Box::new(sources::FileSource::project(
		paths::project_config_path(project_root),
	)));
	registry.register(Box::new(sources::EnvSource::new()));
	registry.register(Box::new(sources::CliSource::new(cli)));

	registry.load()
}
