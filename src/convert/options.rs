//! Per-run conversion options.

use std::time::Duration;

use crate::pipeline::ConcurrencyPolicy;
use crate::rename::CaseSensitivity;
use crate::syntax::format::FormatOptions;

#[derive(Clone, Debug)]
pub struct ConversionOptions {
    /// Extension of source-language documents (no dot).
    pub source_extension: String,
    /// Extension of emitted documents; target paths derive by toggling.
    pub target_extension: String,
    /// Identifier collision rules of the *target* language.
    pub case_sensitivity: CaseSensitivity,
    /// Leave the highest-priority duplicate of a collision group unrenamed.
    pub keep_one_renames: bool,
    /// Emit the project-level diagnostics comparison pseudo-result.
    pub compare_diagnostics: bool,
    /// Formatting style for the optional post-processing pass.
    pub format: FormatOptions,
    /// Idle duration after which optional formatting is abandoned.
    pub format_idle_timeout: Duration,
    /// Concurrency override for this run; `None` uses the shared policy.
    pub policy: Option<ConcurrencyPolicy>,
    /// Emit only the annotated selected fragment instead of whole files.
    pub snippet_only: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            source_extension: "cs".to_string(),
            target_extension: "vb".to_string(),
            case_sensitivity: CaseSensitivity::Insensitive,
            keep_one_renames: true,
            compare_diagnostics: false,
            format: FormatOptions::default(),
            format_idle_timeout: Duration::from_secs(30),
            policy: None,
            snippet_only: false,
        }
    }
}
