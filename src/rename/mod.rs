//! Symbol collision resolution.
//!
//! When uniqueness rules differ between the source and target language
//! (case sensitivity, merged member namespaces), converted projects end up
//! with colliding symbol names. This module resolves them deterministically:
//! the resolver runs strictly sequentially over one batch of candidates,
//! mutating a single [`NameScope`] accumulator passed in by the caller.
//! Nothing here is shared across unrelated conversions.

mod resolver;
mod scope;

pub use resolver::{
    RenameCandidate, ResolvedRename, SymbolId, SymbolKind, Visibility, resolve_all,
};
pub use scope::{CaseSensitivity, NameScope};
