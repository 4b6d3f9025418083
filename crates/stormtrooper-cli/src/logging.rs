// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use stormtrooper_cli_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing targets of the binary and every workspace crate.
const WORKSPACE_TARGETS: &[&str] = &[
	"stormtrooper",
	"stormtrooper_agent",
	"stormtrooper_bridge",
	"stormtrooper_cli_config",
	"stormtrooper_cli_tools",
	"stormtrooper_common_core",
	"stormtrooper_common_http",
	"stormtrooper_llm_openai",
];

/// Filter directive for `level` unless `RUST_LOG` is set.
fn default_directive(level: &str) -> String {
	if level.contains('=') {
		return level.to_string();
	}
	WORKSPACE_TARGETS
		.iter()
		.map(|target| format!("{target}={level}"))
		.collect::<Vec<_>>()
		.join(",")
}

/// Installs the global subscriber. Logs go to stderr; stdout carries only
/// assistant text.
pub fn init_tracing(config: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

	let registry = tracing_subscriber::registry().with(filter);
	match config.format {
		LogFormat::Compact => registry
			.with(
				tracing_subscriber::fmt::layer()
					.compact()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Pretty => registry
			.with(
				tracing_subscriber::fmt::layer()
					.pretty()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
	}
}
