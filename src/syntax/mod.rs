//! Syntax tree model shared by both sides of a conversion.
//!
//! Lexing and parsing live outside this crate; what arrives here is a tree
//! of typed nodes and tokens with attached trivia. The tree is an arena with
//! stable [`NodeId`]s assigned at build time, so edits are keyed by ID and
//! applied in a single reconstruction pass ([`rewrite::TreeEdit`]) rather
//! than by node identity.

pub mod annotations;
pub mod format;
pub mod rewrite;
mod tree;

pub use annotations::Annotation;
pub use tree::{Element, NodeId, SyntaxTree, TreeBuilder, Trivia, TriviaKind};
