// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

pub mod activity;
pub mod config;
pub mod error;
pub mod llm;
pub mod message;
pub mod permission;
pub mod state;
pub mod text;
pub mod tool;

pub use activity::*;
pub use config::*;
pub use error::*;
pub use llm::*;
pub use message::*;
pub use permission::*;
pub use state::*;
pub use text::*;
pub use tool::*;
