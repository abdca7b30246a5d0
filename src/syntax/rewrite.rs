//! Batched, ID-indexed tree edits.
//!
//! Edits accumulate in maps keyed by stable [`NodeId`] and apply in one
//! reconstruction pass over the arena. The input tree is never mutated;
//! overlapping edits to the same token merge instead of retrying.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::syntax::{Element, NodeId, SyntaxTree, Trivia};

/// A batch of pending edits against one tree.
#[derive(Default)]
pub struct TreeEdit {
    token_texts: FxHashMap<NodeId, SmolStr>,
    prepend_leading: FxHashMap<NodeId, Vec<Trivia>>,
    append_trailing: FxHashMap<NodeId, Vec<Trivia>>,
    replace_trailing: FxHashMap<NodeId, Vec<Trivia>>,
}

impl TreeEdit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.token_texts.is_empty()
            && self.prepend_leading.is_empty()
            && self.append_trailing.is_empty()
            && self.replace_trailing.is_empty()
    }

    /// Number of tokens touched by this batch.
    pub fn touched(&self) -> usize {
        let mut ids: Vec<NodeId> = self.token_texts.keys().copied().collect();
        ids.extend(self.prepend_leading.keys());
        ids.extend(self.append_trailing.keys());
        ids.extend(self.replace_trailing.keys());
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn replace_token_text(&mut self, id: NodeId, text: impl Into<SmolStr>) {
        self.token_texts.insert(id, text.into());
    }

    /// Inserts trivia before the token's existing leading list.
    pub fn prepend_leading(&mut self, id: NodeId, mut trivia: Vec<Trivia>) {
        let entry = self.prepend_leading.entry(id).or_default();
        trivia.append(entry);
        *entry = trivia;
    }

    /// Appends trivia after the token's existing trailing list.
    pub fn append_trailing(&mut self, id: NodeId, trivia: Vec<Trivia>) {
        self.append_trailing.entry(id).or_default().extend(trivia);
    }

    /// Replaces the token's trailing list outright. Appends recorded for
    /// the same token still land after the replacement.
    pub fn replace_trailing(&mut self, id: NodeId, trivia: Vec<Trivia>) {
        self.replace_trailing.insert(id, trivia);
    }

    /// Applies the batch, producing a successor tree with the same IDs.
    pub fn apply(mut self, tree: &SyntaxTree) -> SyntaxTree {
        let mut out = tree.clone();
        for (index, element) in out.elements.iter_mut().enumerate() {
            let id = NodeId::from_index(index);
            let Element::Token {
                text,
                leading,
                trailing,
                ..
            } = element
            else {
                continue;
            };
            if let Some(new_text) = self.token_texts.remove(&id) {
                *text = new_text;
            }
            if let Some(mut prefix) = self.prepend_leading.remove(&id) {
                prefix.append(leading);
                *leading = prefix;
            }
            if let Some(replacement) = self.replace_trailing.remove(&id) {
                *trailing = replacement;
            }
            if let Some(suffix) = self.append_trailing.remove(&id) {
                trailing.extend(suffix);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    fn tree() -> (SyntaxTree, NodeId, NodeId) {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        let a = b.token_with_trivia("ident", "a", vec![], vec![Trivia::newline()]);
        let bee = b.token("ident", "b");
        b.finish_node();
        (b.finish(), a, bee)
    }

    #[test]
    fn batched_edits_apply_in_one_pass() {
        let (tree, a, b) = tree();
        let mut edit = TreeEdit::new();
        edit.replace_token_text(b, "renamed");
        edit.prepend_leading(a, vec![Trivia::line_comment("// hi"), Trivia::newline()]);
        edit.append_trailing(a, vec![Trivia::line_comment("// bye")]);
        let next = edit.apply(&tree);
        assert_eq!(next.text(), "// hi\na\n// byerenamed");
        // source tree untouched
        assert_eq!(tree.text(), "a\nb");
    }

    #[test]
    fn prepend_merges_front_to_back() {
        let (tree, a, _) = tree();
        let mut edit = TreeEdit::new();
        edit.prepend_leading(a, vec![Trivia::line_comment("// outer"), Trivia::newline()]);
        edit.prepend_leading(a, vec![Trivia::line_comment("// inner"), Trivia::newline()]);
        let next = edit.apply(&tree);
        assert!(next.text().starts_with("// inner\n// outer\n"));
    }

    #[test]
    fn replace_trailing_wins_over_existing() {
        let (tree, a, _) = tree();
        let mut edit = TreeEdit::new();
        edit.replace_trailing(a, vec![Trivia::whitespace(" ")]);
        let next = edit.apply(&tree);
        assert_eq!(next.text(), "a b");
    }
}
