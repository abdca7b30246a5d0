//! Foundation types for the codeport conversion core.
//!
//! This module provides the small primitives used throughout the crate:
//! - Domain constants (build-artifact directories, project pseudo-paths)
//! - [`toggle_extension`] - source path → target path derivation
//! - [`is_build_artifact`] - exclusion check for generated documents
//!
//! This module has NO dependencies on other codeport modules.

pub mod constants;

use std::path::{Path, PathBuf};

/// Derives a target path from a source path by swapping the file extension.
///
/// The WIP invariant requires a target path to always be derivable from the
/// source path unless explicitly overridden. Paths without the expected
/// source extension still get the target extension appended, so the result
/// is never equal to the input when `from != to`.
pub fn toggle_extension(path: &Path, from: &str, to: &str) -> PathBuf {
    debug_assert_ne!(from, to);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(from) => path.with_extension(to),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".");
            name.push(to);
            PathBuf::from(name)
        }
    }
}

/// Returns true if any component of `path` names a build-artifact directory.
///
/// Documents under these directories are generated output and are excluded
/// from conversion entirely.
pub fn is_build_artifact(path: &Path) -> bool {
    path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| constants::BUILD_ARTIFACT_DIRS.contains(&s))
    })
}
