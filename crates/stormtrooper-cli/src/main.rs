// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Stormtrooper, an AI coding assistant for the terminal.

mod input;
mod interactive;
mod logging;
mod project;
mod repl;
mod sinks;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stormtrooper_agent::{registry_with_spawn, Agent, LinePromptPermission};
use stormtrooper_bridge::Bridge;
use stormtrooper_cli_config::{CliOverrides, ConfigLayer, LoggingConfigLayer};
use stormtrooper_cli_tools::builtin_tools;
use stormtrooper_common_core::{AgentConfig, LlmClient, PermissionHandler};
use stormtrooper_llm_openai::{OpenAIClient, OpenAIConfig};
use tokio::io::BufReader;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::project::ProjectContext;
use crate::repl::Repl;
use crate::sinks::{StderrActivity, StdoutTokens};

/// Stormtrooper - AI coding assistant.
#[derive(Parser, Debug)]
#[command(name = "stormtrooper", about = "AI coding assistant for the terminal", version)]
struct Args {
	/// Model to use (overrides config)
	#[arg(long)]
	model: Option<String>,

	/// Chat-completions base URL (overrides config)
	#[arg(long)]
	base_url: Option<String>,

	/// Log level or filter directive
	#[arg(long)]
	log_level: Option<String>,

	/// Emit logs as JSON
	#[arg(long)]
	json_logs: bool,

	/// Use the plain line-mode REPL instead of the interactive front end
	#[arg(long)]
	no_tui: bool,
}

#[tokio::main]
async fn main() {
	if let Err(e) = run().await {
		eprintln!("Error: {e:#}");
		std::process::exit(1);
	}
}

async fn run() -> anyhow::Result<()> {
	let args = Args::parse();
	let cwd = std::env::current_dir().context("could not determine working directory")?;

	let cli = CliOverrides {
		model: args.model.clone(),
		base_url: args.base_url.clone(),
		log_level: args.log_level.clone(),
		json_logs: args.json_logs,
	};
	let config = if args.no_tui {
		stormtrooper_cli_config::load_config(&cwd, cli)
	} else {
		// The interactive front end shares the terminal with its own output.
		let defaults = ConfigLayer {
			logging: LoggingConfigLayer {
				level: Some("warn".to_string()),
				format: None,
			},
			..Default::default()
		};
		stormtrooper_cli_config::load_config_with_defaults(&cwd, defaults, cli)
	}
	.context("failed to load configuration")?;

	logging::init_tracing(&config.logging);
	info!(model = %config.model, base_url = %config.base_url, "starting stormtrooper");

	let llm: Arc<dyn LlmClient> = Arc::new(
		OpenAIClient::new(OpenAIConfig::new(&config.api_key).with_base_url(&config.base_url))
			.context("failed to build HTTP client")?,
	);

	let project = ProjectContext::load(&cwd).unwrap_or_else(|e| {
		warn!(error = %e, "could not load project context");
		eprintln!("Warning: could not load project context: {e}");
		ProjectContext::bare(&cwd)
	});
	let agent_config = AgentConfig::new(config.model.clone(), cwd.clone());

	if args.no_tui {
		run_line_mode(llm, agent_config, &project).await
	} else {
		run_interactive(llm, agent_config, &project).await
	}
}

async fn run_line_mode(
	llm: Arc<dyn LlmClient>,
	agent_config: AgentConfig,
	project: &ProjectContext,
) -> anyhow::Result<()> {
	let input = Arc::new(Mutex::new(BufReader::new(tokio::io::stdin())));
	let permission: Arc<dyn PermissionHandler> =
		Arc::new(LinePromptPermission::new(input.clone(), tokio::io::stderr()));

	let tools = registry_with_spawn(
		builtin_tools(),
		llm.clone(),
		permission.clone(),
		agent_config.clone(),
	)
	.context("failed to register tools")?;
	let agent = Agent::new(agent_config, llm, tools, permission)
		.with_system_prompt(project.system_prompt())
		.with_sinks(Arc::new(StdoutTokens::new()), Arc::new(StderrActivity));

	let cancel = CancellationToken::new();
	let on_signal = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			on_signal.cancel();
		}
		if tokio::signal::ctrl_c().await.is_ok() {
			std::process::exit(1);
		}
	});

	let mut repl = Repl::new(agent, input, tokio::io::stderr());
	repl.run(&cancel).await
}

async fn run_interactive(
	llm: Arc<dyn LlmClient>,
	agent_config: AgentConfig,
	project: &ProjectContext,
) -> anyhow::Result<()> {
	let bridge = Bridge::new();
	let permission: Arc<dyn PermissionHandler> = bridge.permission_handler();
	let sink = bridge.sink();

	let tools = registry_with_spawn(
		builtin_tools(),
		llm.clone(),
		permission.clone(),
		agent_config.clone(),
	)
	.context("failed to register tools")?;
	let agent = Agent::new(agent_config, llm, tools, permission)
		.with_system_prompt(project.system_prompt())
		.with_sinks(sink.clone(), sink);

	interactive::run(
		bridge,
		agent,
		BufReader::new(tokio::io::stdin()),
		std::io::stdout(),
	)
	.await
}
