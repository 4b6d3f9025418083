// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAI-compatible chat-completions client.
//!
//! Works against any endpoint speaking the OpenAI wire format, OpenRouter
//! being the default.

mod accumulator;
mod client;
mod stream;
mod types;

pub use accumulator::DeltaAccumulator;
pub use client::OpenAIClient;
pub use stream::SseStream;
pub use types::*;
