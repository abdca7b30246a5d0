//! # codeport
//!
//! Core library for whole-project source-to-source conversion between two
//! statically-typed object-oriented languages. The per-construct rewrite
//! rules live in an external Node Converter; this crate is the machinery
//! that makes per-file conversion usable across a whole project: phased
//! orchestration with failure isolation, bounded async fan-out, comment
//! re-anchoring, collision-free renaming, and an idle-timeout governor for
//! optional formatting.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! convert   → orchestrator: phases, WIP records, emit, external seams
//!   ↓
//! rename    → symbol collision resolver + NameScope accumulator
//! trivia    → comment/directive re-anchoring engine
//!   ↓
//! pipeline  → bounded concurrent mapper, concurrency policy, governor
//!   ↓
//! syntax    → arena trees with stable IDs, annotations, rewrite, format
//!   ↓
//! base      → primitives (path toggling, exclusion constants)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → pipeline → rename/trivia → convert)
// ============================================================================

/// Foundation primitives: path derivation, exclusion constants
pub mod base;

/// Syntax: arena trees, trivia, annotations, batched rewrite, formatting
pub mod syntax;

/// Pipeline: bounded concurrent mapper, concurrency policy, idle governor
pub mod pipeline;

/// Renaming: deterministic symbol collision resolution
pub mod rename;

/// Trivia: re-anchoring comments and directives after conversion
pub mod trivia;

/// Conversion: two-phase project orchestrator and external seams
pub mod convert;

// Re-export the types most callers need
pub use convert::{
    ConversionError, ConversionOptions, ConversionResult, ConvertedProject, NodeConverter,
    ProjectConverter, ProjectFile, ProgressSink, SemanticProvider, SourceUnit, WipDocument,
};
pub use pipeline::ConcurrencyPolicy;
pub use syntax::{NodeId, SyntaxTree, TreeBuilder};
