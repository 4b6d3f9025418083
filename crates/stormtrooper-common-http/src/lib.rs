// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.
//!
//! Transport failures are surfaced to callers as-is; nothing here retries.

mod client;

pub use client::{build_client, builder, user_agent, REFERER};
