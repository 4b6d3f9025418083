// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
	#[error("a turn is already running")]
	TurnInProgress,

	#[error("event receiver already taken")]
	ReceiverTaken,
}
