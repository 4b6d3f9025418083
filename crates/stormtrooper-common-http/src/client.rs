// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};

/// Value sent as `HTTP-Referer` so routing providers can attribute traffic.
pub const REFERER: &str = "https://github.com/ghuntley/stormtrooper";

/// Creates a new HTTP client builder with the standard User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Builds a client with the standard User-Agent header.
pub fn build_client() -> Result<Client, reqwest::Error> {
	let client = builder().build()?;
	tracing::debug!(user_agent = %user_agent(), "built HTTP client");
	Ok(client)
}

/// Returns the standard User-Agent string.
///
/// Format: `stormtrooper/{version} ({os}-{arch})`
pub fn user_agent() -> String {
	format!(
		"stormtrooper/{} ({}-{})",
		env!("CARGO_PKG_VERSION"),
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}
