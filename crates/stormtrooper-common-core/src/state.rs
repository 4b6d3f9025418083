// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Per-turn orchestrator state.

/// Where a turn currently is in the model/tool loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentState {
	/// No turn running.
	Idle,
	/// A completion request is in flight.
	AwaitingModel,
	/// Dispatching the tool calls of the last assistant message.
	Executing { pending: usize },
	/// The model answered without tool calls.
	TurnComplete,
	Cancelled,
	Failed,
}

impl AgentState {
	pub fn name(&self) -> &'static str {
		match self {
			AgentState::Idle => "Idle",
			AgentState::AwaitingModel => "AwaitingModel",
			AgentState::Executing { .. } => "Executing",
			AgentState::TurnComplete => "TurnComplete",
			AgentState::Cancelled => "Cancelled",
			AgentState::Failed => "Failed",
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			AgentState::TurnComplete | AgentState::Cancelled | AgentState::Failed
		)
	}
}
