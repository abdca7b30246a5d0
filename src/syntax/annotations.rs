//! Inline annotations left on converted trees.
//!
//! Annotation kinds are process-local string constants; nothing here is
//! persisted. The Node Converter tags converted elements with origin-line
//! claims (consumed by trivia re-anchoring) and with error/warning payloads
//! (merged into the owning document's error list during the second phase).

use crate::syntax::{NodeId, SyntaxTree};

pub mod kinds {
    /// Free-text error attached to a converted element.
    pub const CONVERSION_ERROR: &str = "conversion.error";
    /// Free-text warning attached to a converted element.
    pub const CONVERSION_WARNING: &str = "conversion.warning";
    /// "This element begins what was source line N" (0-based, decimal).
    pub const ORIGIN_LINE_START: &str = "origin.line.start";
    /// "This element ends what was source line N" (0-based, decimal).
    pub const ORIGIN_LINE_END: &str = "origin.line.end";
    /// Marks the sub-node selected for a single-snippet conversion.
    pub const SELECTED_NODE: &str = "selected.node";
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Annotation {
    pub kind: &'static str,
    pub data: String,
}

impl Annotation {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: kinds::CONVERSION_ERROR,
            data: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: kinds::CONVERSION_WARNING,
            data: message.into(),
        }
    }

    pub fn origin_start(line: u32) -> Self {
        Self {
            kind: kinds::ORIGIN_LINE_START,
            data: line.to_string(),
        }
    }

    pub fn origin_end(line: u32) -> Self {
        Self {
            kind: kinds::ORIGIN_LINE_END,
            data: line.to_string(),
        }
    }

    pub fn selected() -> Self {
        Self {
            kind: kinds::SELECTED_NODE,
            data: String::new(),
        }
    }
}

fn line_claim(tree: &SyntaxTree, id: NodeId, kind: &'static str) -> Option<u32> {
    tree.annotations(id)
        .iter()
        .find(|a| a.kind == kind)
        .and_then(|a| a.data.parse().ok())
}

/// The source line this element claims to begin, if tagged.
pub fn origin_start(tree: &SyntaxTree, id: NodeId) -> Option<u32> {
    line_claim(tree, id, kinds::ORIGIN_LINE_START)
}

/// The source line this element claims to end, if tagged.
pub fn origin_end(tree: &SyntaxTree, id: NodeId) -> Option<u32> {
    line_claim(tree, id, kinds::ORIGIN_LINE_END)
}

/// Collects every inline error/warning annotation in the tree, in document
/// order, formatted for a document's error list.
pub fn collect_inline_messages(tree: &SyntaxTree) -> Vec<String> {
    let mut messages = Vec::new();
    for id in tree.preorder(tree.root()) {
        for a in tree.annotations(id) {
            match a.kind {
                kinds::CONVERSION_ERROR => messages.push(format!("error: {}", a.data)),
                kinds::CONVERSION_WARNING => messages.push(format!("warning: {}", a.data)),
                _ => {}
            }
        }
    }
    messages
}

/// Finds the element annotated as the selected snippet, if any.
pub fn find_selected(tree: &SyntaxTree) -> Option<NodeId> {
    tree.preorder(tree.root())
        .into_iter()
        .find(|&id| {
            tree.annotations(id)
                .iter()
                .any(|a| a.kind == kinds::SELECTED_NODE)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    #[test]
    fn origin_claims_round_trip() {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        let tok = b.token("ident", "x");
        b.annotate(tok, Annotation::origin_start(4));
        b.annotate(tok, Annotation::origin_end(4));
        b.finish_node();
        let tree = b.finish();
        assert_eq!(origin_start(&tree, tok), Some(4));
        assert_eq!(origin_end(&tree, tok), Some(4));
    }

    #[test]
    fn inline_messages_collected_in_document_order() {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        let a = b.token("ident", "a");
        b.annotate(a, Annotation::error("unsupported construct"));
        let z = b.token("ident", "z");
        b.annotate(z, Annotation::warning("lossy cast"));
        b.finish_node();
        let tree = b.finish();
        assert_eq!(
            collect_inline_messages(&tree),
            vec![
                "error: unsupported construct".to_string(),
                "warning: lossy cast".to_string()
            ]
        );
    }
}
