// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

mod edit_file;
mod glob;
mod grep;
mod memory_write;
mod paths;
mod read_file;
mod registry;
mod shell_exec;
mod write_file;

pub use edit_file::EditFileTool;
pub use glob::GlobTool;
pub use grep::GrepTool;
pub use memory_write::{MemoryWriteTool, MEMORY_DIR};
pub use read_file::ReadFileTool;
pub use registry::{Tool, ToolRegistry, DENIED_RESULT, PREVIEW_MAX_CHARS};
pub use shell_exec::ShellExecTool;
pub use write_file::WriteFileTool;

use std::sync::Arc;

/// The file, search and shell tools every session starts with, in catalog
/// order.
pub fn builtin_tools() -> Vec<Arc<dyn Tool>> {
	vec![
		Arc::new(ReadFileTool::new()),
		Arc::new(WriteFileTool::new()),
		Arc::new(EditFileTool::new()),
		Arc::new(ShellExecTool::new()),
		Arc::new(GlobTool::new()),
		Arc::new(GrepTool::new()),
		Arc::new(MemoryWriteTool::new()),
	]
}
