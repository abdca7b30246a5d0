//! External collaborator seams.
//!
//! The per-construct rewrite rules live in the external Node Converter;
//! symbol resolution lives in the external Semantic Information Provider.
//! This module defines the traits the orchestrator consumes them through.

use std::future::Future;
use std::sync::Arc;

use crate::convert::result::ConversionResult;
use crate::convert::wip::{ProjectFile, SourceUnit, WipDocument};
use crate::rename::{RenameCandidate, SymbolId};
use crate::syntax::{NodeId, SyntaxTree};

/// The assembled whole-project snapshot built from all Phase1 payloads.
///
/// Treated as immutable: Phase2 and the semantic provider read it
/// concurrently without locking; edits build successor snapshots.
#[derive(Clone, Debug)]
pub struct ConvertedProject {
    pub documents: Vec<WipDocument>,
}

impl ConvertedProject {
    pub fn payloads(&self) -> impl Iterator<Item = (usize, &SyntaxTree)> {
        self.documents
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.payload.as_ref().map(|t| (i, t)))
    }
}

/// External per-construct rewrite engine, consumed one document at a time.
///
/// A converted tree may carry inline error/warning annotations (well-known
/// kinds, free-text payload) and origin-line start/end markers consumed by
/// trivia re-anchoring.
pub trait NodeConverter: Send + Sync + 'static {
    fn convert_document(
        &self,
        unit: Arc<SourceUnit>,
        semantics: Arc<dyn SemanticProvider>,
    ) -> impl Future<Output = Result<SyntaxTree, String>> + Send;

    /// Converts a non-code project document, or `None` to skip it.
    fn convert_other(&self, file: &ProjectFile) -> Option<ConversionResult> {
        let _ = file;
        None
    }
}

/// External semantic information provider over source and converted trees.
///
/// Symbol lookups happen *after* structural edits, so implementations must
/// support finding a similar symbol rather than relying on node identity.
pub trait SemanticProvider: Send + Sync + 'static {
    /// Compilation diagnostics of the original project.
    fn source_diagnostics(&self, units: &[Arc<SourceUnit>]) -> Vec<String>;

    /// Compilation diagnostics of the converted snapshot.
    fn converted_diagnostics(&self, project: &ConvertedProject) -> Vec<String>;

    /// Rename candidates across the converted project, already in the
    /// fixed order the sequential resolver must process them in.
    fn rename_candidates(&self, project: &ConvertedProject) -> Vec<RenameCandidate>;

    /// Whether a name is usable in the target language (not a keyword,
    /// not otherwise reserved).
    fn name_usable(&self, name: &str) -> bool;

    /// Locates the declaration token of a symbol after edits, as
    /// (document index, token id). `None` if the symbol no longer resolves.
    fn find_symbol_token(
        &self,
        project: &ConvertedProject,
        symbol: SymbolId,
    ) -> Option<(usize, NodeId)>;

    /// Cross-file simplification / qualification reduction for one
    /// converted document, against the whole-project snapshot.
    fn reduce_qualifications(
        &self,
        project: &ConvertedProject,
        document: usize,
    ) -> Result<SyntaxTree, String>;
}
