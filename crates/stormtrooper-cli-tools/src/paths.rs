// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};

use stormtrooper_common_core::ToolError;

/// Resolves `path` against `root` and rejects anything that lands outside it.
///
/// The target itself need not exist: the nearest existing ancestor is
/// canonicalized and the remaining components are appended, so new files can
/// be created while symlinks and `..` still cannot escape the root.
pub(crate) fn resolve_within(path: &Path, root: &Path) -> Result<PathBuf, ToolError> {
	let absolute = if path.is_absolute() {
		path.to_path_buf()
	} else {
		root.join(path)
	};

	let root_canonical = root
		.canonicalize()
		.map_err(|_| ToolError::FileNotFound(root.to_path_buf()))?;

	let mut existing = absolute.as_path();
	let mut missing = Vec::new();
	while !existing.exists() {
		let Some(name) = existing.file_name() else {
			return Err(ToolError::InvalidArguments(format!(
				"cannot resolve path: {}",
				absolute.display()
			)));
		};
		missing.push(name.to_os_string());
		existing = existing
			.parent()
			.ok_or_else(|| ToolError::FileNotFound(absolute.clone()))?;
	}

	let mut resolved = existing
		.canonicalize()
		.map_err(|_| ToolError::FileNotFound(absolute.clone()))?;
	for name in missing.into_iter().rev() {
		resolved.push(name);
	}

	if !resolved.starts_with(&root_canonical) {
		return Err(ToolError::PathOutsideWorkspace(resolved));
	}

	Ok(resolved)
}

/// Like [`resolve_within`] but the target must already exist.
pub(crate) fn resolve_existing(path: &Path, root: &Path) -> Result<PathBuf, ToolError> {
	let resolved = resolve_within(path, root)?;
	if !resolved.exists() {
		return Err(ToolError::FileNotFound(resolved));
	}
	Ok(resolved)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn relative_paths_resolve_under_root() {
		let root = TempDir::new().unwrap();
		std::fs::write(root.path().join("a.txt"), "x").unwrap();

		let resolved = resolve_existing(Path::new("a.txt"), root.path()).unwrap();
		assert_eq!(resolved, root.path().canonicalize().unwrap().join("a.txt"));
	}

	#[test]
	fn missing_targets_resolve_for_creation() {
		let root = TempDir::new().unwrap();
		let resolved = resolve_within(Path::new("new/dir/file.rs"), root.path()).unwrap();
		assert!(resolved.ends_with("new/dir/file.rs"));
		assert!(resolved.starts_with(root.path().canonicalize().unwrap()));
	}

	#[test]
	fn parent_escapes_are_rejected() {
		let root = TempDir::new().unwrap();
		std::fs::create_dir(root.path().join("sub")).unwrap();

		let err = resolve_within(Path::new("sub/../../outside.txt"), root.path()).unwrap_err();
		assert!(matches!(err, ToolError::PathOutsideWorkspace(_)));
	}

	#[test]
	fn absolute_paths_outside_root_are_rejected() {
		let root = TempDir::new().unwrap();
		let other = TempDir::new().unwrap();

		let err = resolve_within(other.path(), root.path()).unwrap_err();
		assert!(matches!(err, ToolError::PathOutsideWorkspace(_)));
	}
}
