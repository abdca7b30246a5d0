//! Source units and work-in-progress records.

use std::path::PathBuf;
use std::sync::Arc;

use crate::base::toggle_extension;
use crate::convert::options::ConversionOptions;
use crate::syntax::SyntaxTree;

/// One parsed source document entering conversion.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Name of the owning project, for progress reporting.
    pub project: String,
    pub text: String,
    pub tree: SyntaxTree,
}

impl SourceUnit {
    /// Size estimate used to order Phase1 largest-first, which lowers the
    /// peak memory held across the Phase2 barrier.
    pub fn estimated_size(&self) -> usize {
        self.text.len()
    }
}

/// A non-code project document (build file, resource) handed to the
/// external converter's non-code path.
#[derive(Clone, Debug)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub text: String,
}

/// Per-document container threaded through both conversion phases.
///
/// The payload moves `unconverted → converted → simplified/formatted`;
/// errors are only ever appended, never dropped. The target path is always
/// derivable from the source path unless explicitly overridden.
#[derive(Clone, Debug)]
pub struct WipDocument {
    pub unit: Arc<SourceUnit>,
    pub target_override: Option<PathBuf>,
    pub payload: Option<SyntaxTree>,
    pub errors: Vec<String>,
}

impl WipDocument {
    pub fn new(unit: Arc<SourceUnit>) -> Self {
        Self {
            unit,
            target_override: None,
            payload: None,
            errors: Vec::new(),
        }
    }

    /// Resolved target path: the override if set, else the extension toggle.
    pub fn target_path(&self, options: &ConversionOptions) -> PathBuf {
        self.target_override.clone().unwrap_or_else(|| {
            toggle_extension(
                &self.unit.path,
                &options.source_extension,
                &options.target_extension,
            )
        })
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    fn unit(path: &str) -> Arc<SourceUnit> {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        b.finish_node();
        Arc::new(SourceUnit {
            path: PathBuf::from(path),
            project: "app".to_string(),
            text: String::new(),
            tree: b.finish(),
        })
    }

    #[test]
    fn target_path_is_always_resolvable() {
        let options = ConversionOptions::default();
        let wip = WipDocument::new(unit("src/A.cs"));
        assert_eq!(wip.target_path(&options), PathBuf::from("src/A.vb"));

        let mut overridden = WipDocument::new(unit("src/A.cs"));
        overridden.target_override = Some(PathBuf::from("out/B.vb"));
        assert_eq!(overridden.target_path(&options), PathBuf::from("out/B.vb"));
    }

    #[test]
    fn errors_append_only() {
        let mut wip = WipDocument::new(unit("src/A.cs"));
        wip.record_error("first");
        wip.record_error("second");
        assert_eq!(wip.errors, vec!["first", "second"]);
    }
}
