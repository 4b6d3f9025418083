// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The conversation orchestrator.
//!
//! An [`Agent`] owns one conversation history and drives the
//! model/tool loop for each user turn. The protocol client, tool registry
//! and permission handler are injected and may be shared with nested
//! sub-agents spawned through [`SpawnAgentTool`].

mod agent;
mod filter;
mod permission;
mod spawn;

#[cfg(test)]
mod testing;

pub use agent::Agent;
pub use filter::VisibleTokenFilter;
pub use permission::LinePromptPermission;
pub use spawn::{registry_with_spawn, CapturedTokens, SpawnAgentTool, SUB_AGENT_TASK_PREVIEW_CHARS};
