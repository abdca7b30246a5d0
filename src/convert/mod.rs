//! # Project conversion orchestration
//!
//! Sequences per-file conversion against whole-project semantic passes
//! while isolating failures to the document that caused them.
//!
//! The orchestrator moves through
//! `Init → Phase1 → Assemble → (Warnings) → Phase2 → Emit`:
//! Phase1 fans the external Node Converter out over every non-excluded
//! document; Assemble snapshots the converted project (Phase2 never starts
//! before Phase1 fully materializes, whole-project semantics require it);
//! the optional Warnings step diffs compilation diagnostics; Phase2 runs
//! cross-file simplification, trivia re-anchoring, and governed formatting;
//! Emit hands one result per document to the external writer.

mod core;
mod error;
mod options;
mod progress;
mod result;
mod snippet;
mod traits;
mod wip;

pub use core::ProjectConverter;
pub use error::ConversionError;
pub use options::ConversionOptions;
pub use progress::{ChannelProgress, FileProgress, NullProgress, PhaseKind, PhaseProgress, ProgressSink};
pub use result::ConversionResult;
pub use snippet::extract_selected_fragment;
pub use traits::{ConvertedProject, NodeConverter, SemanticProvider};
pub use wip::{ProjectFile, SourceUnit, WipDocument};
