// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

/// Shortens `text` to at most `max_chars` characters, appending `...` when
/// anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
		None => text.to_string(),
	}
}
