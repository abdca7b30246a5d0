//! Final per-document results handed to the external writer.

use std::path::PathBuf;

/// One emitted conversion outcome.
///
/// Every result names both paths except the project-level diagnostics
/// pseudo-result, which has no target path. `text` is `None` when the
/// document failed outright; its errors say why.
#[derive(Clone, Debug)]
pub struct ConversionResult {
    pub source_path: PathBuf,
    pub target_path: Option<PathBuf>,
    pub text: Option<String>,
    pub errors: Vec<String>,
    /// True when the emitted text equals the original source, letting the
    /// writer skip the file.
    pub identity: bool,
}

impl ConversionResult {
    pub fn succeeded(&self) -> bool {
        self.text.is_some() && self.errors.is_empty()
    }
}
