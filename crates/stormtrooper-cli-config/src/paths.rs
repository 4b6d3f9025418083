// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locations of the configuration files.

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Directory name used both under the home directory and the project root.
pub const CONFIG_DIR_NAME: &str = ".stormtrooper";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Global config file: `~/.stormtrooper/config.toml`.
pub fn global_config_path() -> Result<PathBuf, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
	let path = home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
	tracing::debug!(path = %path.display(), "resolved global config path");
	Ok(path)
}

/// Project config file under `root`: `<root>/.stormtrooper/config.toml`.
pub fn project_config_path(root: &Path) -> PathBuf {
	root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
}
