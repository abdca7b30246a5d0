//! The two-phase project conversion orchestrator.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::base::constants::PROJECT_WARNINGS_PATH;
use crate::base::is_build_artifact;
use crate::convert::error::ConversionError;
use crate::convert::options::ConversionOptions;
use crate::convert::progress::{
    FileProgress, NullProgress, PhaseKind, PhaseProgress, ProgressSink,
};
use crate::convert::result::ConversionResult;
use crate::convert::snippet::extract_selected_fragment;
use crate::convert::traits::{ConvertedProject, NodeConverter, SemanticProvider};
use crate::convert::wip::{ProjectFile, SourceUnit, WipDocument};
use crate::pipeline::{ConcurrencyPolicy, FormatGovernor, map_unordered};
use crate::rename::{NameScope, resolve_all};
use crate::syntax::format::{format_tree, normalize};
use crate::syntax::rewrite::TreeEdit;
use crate::syntax::{Annotation, SyntaxTree, annotations};
use crate::trivia;

/// Converts whole multi-file projects, one batch at a time.
///
/// A per-document failure in either phase is caught, recorded on that
/// document's error list, and never aborts the batch; the only batch-wide
/// abort is cancellation of the caller's token, which stops admitting
/// documents and returns the results completed so far.
pub struct ProjectConverter<C, S> {
    converter: Arc<C>,
    semantics: Arc<S>,
    options: ConversionOptions,
    progress: Arc<dyn ProgressSink>,
}

impl<C: NodeConverter, S: SemanticProvider> ProjectConverter<C, S> {
    pub fn new(converter: C, semantics: S, options: ConversionOptions) -> Self {
        Self {
            converter: Arc::new(converter),
            semantics: Arc::new(semantics),
            options,
            progress: Arc::new(NullProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs the full conversion. Results arrive in document path order,
    /// preceded by the optional project-level diagnostics pseudo-result and
    /// followed by non-code document results.
    pub async fn convert_project(
        &self,
        units: Vec<SourceUnit>,
        other_files: Vec<ProjectFile>,
        cancel: CancellationToken,
    ) -> Result<Vec<ConversionResult>, ConversionError> {
        let policy = self.options.policy.unwrap_or_else(ConcurrencyPolicy::shared);

        let units: Vec<Arc<SourceUnit>> = units
            .into_iter()
            .filter(|u| !is_build_artifact(&u.path))
            .map(Arc::new)
            .collect();

        let project = self.run_phase1(units.clone(), policy, &cancel).await?;

        self.progress.phase_started(PhaseProgress {
            phase: PhaseKind::Assembling,
            documents: project.documents.len(),
        });

        let mut results = Vec::new();
        if self.options.compare_diagnostics {
            self.progress.phase_started(PhaseProgress {
                phase: PhaseKind::ComparingDiagnostics,
                documents: project.documents.len(),
            });
            if let Some(result) = self.diagnostics_result(&units, &project) {
                results.push(result);
            }
        }

        let project = self.apply_renames(project);

        let outcomes = self.run_phase2(project, policy, &cancel).await?;

        self.progress.phase_started(PhaseProgress {
            phase: PhaseKind::Emitting,
            documents: outcomes.len(),
        });
        for (document, text, tree) in outcomes {
            results.push(self.emit(document, text, tree));
        }
        for file in &other_files {
            if let Some(result) = self.converter.convert_other(file) {
                results.push(result);
            }
        }
        Ok(results)
    }

    /// Phase1: per-document conversion through the bounded mapper,
    /// largest-first. Fully materializes before returning; Phase2 depends
    /// on whole-project semantic information.
    async fn run_phase1(
        &self,
        mut units: Vec<Arc<SourceUnit>>,
        policy: ConcurrencyPolicy,
        cancel: &CancellationToken,
    ) -> Result<ConvertedProject, ConversionError> {
        units.sort_by(|a, b| b.estimated_size().cmp(&a.estimated_size()));
        self.progress.phase_started(PhaseProgress {
            phase: PhaseKind::Converting,
            documents: units.len(),
        });

        let converter = Arc::clone(&self.converter);
        let semantics: Arc<dyn SemanticProvider> = self.semantics.clone();
        let mut outputs = map_unordered(units, policy, cancel.child_token(), move |unit| {
            let converter = Arc::clone(&converter);
            let semantics = Arc::clone(&semantics);
            async move {
                let converted = converter
                    .convert_document(Arc::clone(&unit), semantics)
                    .await;
                (unit, converted)
            }
        });

        let mut documents = Vec::new();
        while let Some(item) = outputs.next().await {
            let (unit, converted) = item?;
            let mut document = WipDocument::new(unit);
            match converted {
                Ok(tree) => document.payload = Some(tree),
                Err(message) => {
                    debug!(path = %document.unit.path.display(), %message, "document conversion failed");
                    document.record_error(message);
                }
            }
            self.progress.file_completed(FileProgress {
                path: document.unit.path.clone(),
                succeeded: document.errors.is_empty(),
            });
            documents.push(document);
        }

        // Mapper output is completion-ordered; restore a deterministic
        // document order for assembly and emission.
        documents.sort_by(|a, b| a.unit.path.cmp(&b.unit.path));
        Ok(ConvertedProject { documents })
    }

    /// Diffs source vs. converted compilation diagnostics into the single
    /// synthetic result with no target path.
    fn diagnostics_result(
        &self,
        units: &[Arc<SourceUnit>],
        project: &ConvertedProject,
    ) -> Option<ConversionResult> {
        let before = self.semantics.source_diagnostics(units);
        let introduced: Vec<String> = self
            .semantics
            .converted_diagnostics(project)
            .into_iter()
            .filter(|d| !before.contains(d))
            .collect();
        if introduced.is_empty() {
            return None;
        }
        Some(ConversionResult {
            source_path: PathBuf::from(PROJECT_WARNINGS_PATH),
            target_path: None,
            text: Some(introduced.join("\n")),
            errors: Vec::new(),
            identity: false,
        })
    }

    /// The whole-project rename pass. Strictly sequential: one NameScope
    /// accumulator, candidates in the provider's fixed order, no concurrent
    /// mutation.
    fn apply_renames(&self, mut project: ConvertedProject) -> ConvertedProject {
        let candidates = self.semantics.rename_candidates(&project);
        if candidates.is_empty() {
            return project;
        }

        let mut scope = NameScope::new(self.options.case_sensitivity);
        let semantics = &self.semantics;
        let usable = |name: &str| semantics.name_usable(name);
        let resolved = resolve_all(
            &candidates,
            &usable,
            self.options.keep_one_renames,
            &mut scope,
        );

        let mut edits: Vec<TreeEdit> = (0..project.documents.len())
            .map(|_| TreeEdit::new())
            .collect();
        for rename in resolved.iter().filter(|r| r.changed) {
            match self.semantics.find_symbol_token(&project, rename.symbol) {
                None => {
                    // A later batch member may already satisfy uniqueness;
                    // an unresolvable symbol is skipped, not escalated.
                    trace!(symbol = rename.symbol.0, "rename target unresolved; skipping");
                }
                Some((index, token)) => {
                    let Some(payload) = project.documents[index].payload.as_mut() else {
                        continue;
                    };
                    if payload.is_token(token) {
                        edits[index].replace_token_text(token, rename.name.clone());
                    } else {
                        // A misdirected lookup becomes a warning on the
                        // offending node, not a file failure.
                        payload.push_annotation(
                            token,
                            Annotation::warning(format!(
                                "could not apply rename to '{}'",
                                rename.name
                            )),
                        );
                    }
                }
            }
        }

        for (document, edit) in project.documents.iter_mut().zip(edits) {
            if edit.is_empty() {
                continue;
            }
            if let Some(payload) = document.payload.take() {
                document.payload = Some(edit.apply(&payload));
            }
        }
        project
    }

    /// Phase2: per-document cross-file simplification, trivia re-anchoring,
    /// and governed formatting, again through the bounded mapper.
    async fn run_phase2(
        &self,
        project: ConvertedProject,
        policy: ConcurrencyPolicy,
        cancel: &CancellationToken,
    ) -> Result<Vec<(WipDocument, Option<String>, Option<SyntaxTree>)>, ConversionError> {
        self.progress.phase_started(PhaseProgress {
            phase: PhaseKind::Simplifying,
            documents: project.documents.len(),
        });

        let project = Arc::new(project);
        let semantics: Arc<dyn SemanticProvider> = self.semantics.clone();
        let governor = Arc::new(FormatGovernor::new(self.options.format_idle_timeout));
        let format = self.options.format.clone();

        let shared = Arc::clone(&project);
        let mut outputs = map_unordered(
            0..project.documents.len(),
            policy,
            cancel.child_token(),
            move |index| {
                let project = Arc::clone(&shared);
                let semantics = Arc::clone(&semantics);
                let governor = Arc::clone(&governor);
                let format = format.clone();
                async move { second_pass(&project, semantics, &governor, &format, index) }
            },
        );

        let mut outcomes: Vec<Option<DocOutcome>> =
            (0..project.documents.len()).map(|_| None).collect();
        while let Some(item) = outputs.next().await {
            let outcome = item?;
            self.progress.file_completed(FileProgress {
                path: project.documents[outcome.index].unit.path.clone(),
                succeeded: outcome.errors.is_empty(),
            });
            let index = outcome.index;
            outcomes[index] = Some(outcome);
        }

        drop(outputs);
        let project = Arc::try_unwrap(project).unwrap_or_else(|arc| (*arc).clone());
        let mut emitted = Vec::with_capacity(project.documents.len());
        for (index, mut document) in project.documents.into_iter().enumerate() {
            match outcomes[index].take() {
                Some(outcome) => {
                    for error in outcome.errors {
                        document.record_error(error);
                    }
                    emitted.push((document, outcome.text, outcome.tree));
                }
                // Admission stopped by cancellation before this document.
                None => emitted.push((document, None, None)),
            }
        }
        Ok(emitted)
    }

    fn emit(
        &self,
        document: WipDocument,
        text: Option<String>,
        tree: Option<SyntaxTree>,
    ) -> ConversionResult {
        let text = if self.options.snippet_only {
            tree.as_ref().and_then(extract_selected_fragment).or(text)
        } else {
            text
        };
        let identity = text.as_deref() == Some(document.unit.text.as_str());
        ConversionResult {
            source_path: document.unit.path.clone(),
            target_path: Some(document.target_path(&self.options)),
            text,
            errors: document.errors,
            identity,
        }
    }
}

struct DocOutcome {
    index: usize,
    text: Option<String>,
    tree: Option<SyntaxTree>,
    errors: Vec<String>,
}

/// One document's second pass. Failures fall back rather than abort: a
/// failed simplification keeps the pre-simplification tree, a failed
/// re-anchoring becomes a warning annotation, and abandoned formatting
/// degrades to plain normalization through the governor.
fn second_pass(
    project: &ConvertedProject,
    semantics: Arc<dyn SemanticProvider>,
    governor: &FormatGovernor,
    format: &crate::syntax::format::FormatOptions,
    index: usize,
) -> DocOutcome {
    let document = &project.documents[index];
    let mut errors = Vec::new();

    let Some(payload) = document.payload.as_ref() else {
        return DocOutcome {
            index,
            text: None,
            tree: None,
            errors,
        };
    };

    let simplified = match semantics.reduce_qualifications(project, index) {
        Ok(tree) => tree,
        Err(message) => {
            warn!(path = %document.unit.path.display(), %message, "simplification failed; keeping unsimplified tree");
            errors.push(format!("simplification failed: {message}"));
            payload.clone()
        }
    };

    let anchored = match trivia::reanchor(&document.unit.tree, &simplified) {
        Ok(tree) => tree,
        Err(err) => {
            let mut tree = simplified;
            let root = tree.root();
            tree.push_annotation(root, Annotation::warning(format!("comment re-anchoring failed: {err}")));
            tree
        }
    };

    // Inline annotations left on the tree since Phase1 merge into the
    // document's error list here.
    errors.extend(annotations::collect_inline_messages(&anchored));

    let text = governor.run_or_fallback(
        |token| format_tree(&anchored, format, token),
        || normalize(&anchored.text()),
    );

    DocOutcome {
        index,
        text: Some(text),
        tree: Some(anchored),
        errors,
    }
}
