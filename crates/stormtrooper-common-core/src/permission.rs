// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

/// Decides whether an approval-tier tool may run.
///
/// `check` suspends the dispatching task until a decision exists. It carries
/// no timeout; implementations must resolve to `false` when their decision
/// source goes away.
#[async_trait]
pub trait PermissionHandler: Send + Sync {
	async fn check(&self, tool_name: &str, preview: &str) -> bool;
}
