//! Domain constants shared across the conversion core.

/// Directory names whose contents are build artifacts, never converted.
pub const BUILD_ARTIFACT_DIRS: &[&str] = &["bin", "obj", "target", ".git", ".vs"];

/// Pseudo source path for the project-level diagnostics comparison result.
///
/// This is the one result in a batch that carries no target path.
pub const PROJECT_WARNINGS_PATH: &str = "<project-warnings>";
