//! Scripted Node Converter and Semantic Provider doubles.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use codeport::convert::{ConvertedProject, NodeConverter, SemanticProvider};
use codeport::rename::{RenameCandidate, SymbolId, SymbolKind, Visibility};
use codeport::syntax::{Annotation, NodeId, SyntaxTree, TreeBuilder, Trivia};
use codeport::SourceUnit;

/// Converts statement-shaped fixtures deterministically; behavior per path
/// is scripted up front.
#[derive(Default)]
pub struct ScriptedConverter {
    /// Documents whose conversion fails outright.
    pub fail: HashSet<PathBuf>,
    /// Documents that get an inline warning annotation.
    pub warn: HashSet<PathBuf>,
    /// Identifier whose statement is annotated as the selected snippet.
    pub select_ident: Option<String>,
}

impl NodeConverter for ScriptedConverter {
    fn convert_document(
        &self,
        unit: Arc<SourceUnit>,
        _semantics: Arc<dyn SemanticProvider>,
    ) -> impl Future<Output = Result<SyntaxTree, String>> + Send {
        let fail = self.fail.contains(&unit.path);
        let warn = self.warn.contains(&unit.path);
        let select = self.select_ident.clone();
        async move {
            tokio::task::yield_now().await;
            if fail {
                return Err(format!("cannot convert {}", unit.path.display()));
            }
            Ok(convert_tree(&unit.tree, warn, select.as_deref()))
        }
    }
}

/// Rebuilds the source statements as converted statements, tagging every
/// statement node with the origin lines of its tokens.
pub fn convert_tree(source: &SyntaxTree, warn: bool, select: Option<&str>) -> SyntaxTree {
    let lines = source.token_lines();
    let tokens = source.tokens();

    let mut groups: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();
    for token in tokens {
        let is_terminator = source.token_text(token).as_str() == ";";
        current.push(token);
        if is_terminator {
            groups.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    let mut b = TreeBuilder::new();
    b.start_node("unit");
    let mut warned = false;
    for group in &groups {
        b.start_node("stmt");
        for &token in group {
            let text = source.token_text(token).clone();
            let trailing = if text.as_str() == ";" {
                vec![Trivia::newline()]
            } else {
                Vec::new()
            };
            let id = b.token_with_trivia(source.kind(token).clone(), text, vec![], trailing);
            if warn && !warned {
                b.annotate(id, Annotation::warning("manual conversion required"));
                warned = true;
            }
        }
        let stmt = b.finish_node();
        b.annotate(stmt, Annotation::origin_start(lines[&group[0]]));
        b.annotate(stmt, Annotation::origin_end(lines[group.last().unwrap()]));
        if let Some(select) = select {
            if source.token_text(group[0]).as_str() == select {
                b.annotate(stmt, Annotation::selected());
            }
        }
    }
    b.finish_node();
    b.finish()
}

/// Semantic provider double with canned answers.
#[derive(Default)]
pub struct StaticSemantics {
    pub candidates: Vec<RenameCandidate>,
    /// Symbol id → (document path, declaration token text).
    pub symbol_tokens: HashMap<u64, (PathBuf, String)>,
    pub simplify_fail: HashSet<PathBuf>,
    pub source_diags: Vec<String>,
    pub converted_diags: Vec<String>,
    pub keywords: HashSet<String>,
}

impl SemanticProvider for StaticSemantics {
    fn source_diagnostics(&self, _units: &[Arc<SourceUnit>]) -> Vec<String> {
        self.source_diags.clone()
    }

    fn converted_diagnostics(&self, _project: &ConvertedProject) -> Vec<String> {
        self.converted_diags.clone()
    }

    fn rename_candidates(&self, _project: &ConvertedProject) -> Vec<RenameCandidate> {
        self.candidates.clone()
    }

    fn name_usable(&self, name: &str) -> bool {
        !self.keywords.contains(name)
    }

    fn find_symbol_token(
        &self,
        project: &ConvertedProject,
        symbol: SymbolId,
    ) -> Option<(usize, NodeId)> {
        let (path, text) = self.symbol_tokens.get(&symbol.0)?;
        let (index, document) = project
            .documents
            .iter()
            .enumerate()
            .find(|(_, d)| &d.unit.path == path)?;
        let tree = document.payload.as_ref()?;
        tree.tokens()
            .into_iter()
            .find(|&t| tree.token_text(t).as_str() == text)
            .map(|t| (index, t))
    }

    fn reduce_qualifications(
        &self,
        project: &ConvertedProject,
        document: usize,
    ) -> Result<SyntaxTree, String> {
        let doc = &project.documents[document];
        if self.simplify_fail.contains(&doc.unit.path) {
            return Err("no semantic model for document".to_string());
        }
        doc.payload
            .clone()
            .ok_or_else(|| "document has no payload".to_string())
    }
}

/// A plain non-fixed rename candidate.
pub fn candidate(id: u64, name: &str, kind: SymbolKind) -> RenameCandidate {
    RenameCandidate {
        symbol: SymbolId(id),
        base_name: name.to_string(),
        fixed: false,
        kind,
        visibility: Visibility::Private,
        parameterish: false,
        signature: None,
    }
}
