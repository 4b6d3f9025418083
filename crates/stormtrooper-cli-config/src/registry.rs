// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ordered collection of configuration sources.

use tracing::debug;

use crate::error::ConfigError;
use crate::layer::{ConfigLayer, StormtrooperConfig};
use crate::sources::ConfigSource;

#[derive(Default)]
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		self.sources.push(source);
	}

	/// Merges every source from lowest to highest precedence.
	pub fn merged(&self) -> Result<ConfigLayer, ConfigError> {
		let mut sources: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
		sources.sort_by_key(|s| s.precedence());

		let mut merged = ConfigLayer::default();
		for source in sources {
			debug!(source = source.name(), "merging config source");
			merged.merge(source.load()?);
		}
		Ok(merged)
	}

	pub fn load(&self) -> Result<StormtrooperConfig, ConfigError> {
		self.merged()?.finalize()
	}
}
