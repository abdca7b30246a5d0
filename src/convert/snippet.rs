//! Selected-fragment extraction for single-snippet conversions.

use crate::syntax::annotations;
use crate::syntax::SyntaxTree;

/// Renders only the sub-node annotated as selected, re-attaching the
/// adjacent significant trivia and dropping surrounding layout. Returns
/// `None` when no element carries the selection annotation.
pub fn extract_selected_fragment(tree: &SyntaxTree) -> Option<String> {
    let selected = annotations::find_selected(tree)?;
    let tokens = tree.tokens_of(selected);
    let last_index = tokens.len().checked_sub(1)?;

    let mut out = String::new();
    for (i, token) in tokens.iter().copied().enumerate() {
        if i == 0 {
            for t in tree.leading(token).iter().filter(|t| t.is_significant()) {
                out.push_str(&t.text);
                out.push('\n');
            }
        } else {
            for t in tree.leading(token) {
                out.push_str(&t.text);
            }
        }
        out.push_str(tree.token_text(token));
        if i == last_index {
            for t in tree.trailing(token).iter().filter(|t| t.is_significant()) {
                out.push(' ');
                out.push_str(&t.text);
            }
        } else {
            for t in tree.trailing(token) {
                out.push_str(&t.text);
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Annotation, TreeBuilder, Trivia};

    #[test]
    fn extracts_only_the_selected_subtree() {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        b.token_with_trivia("kw", "class", vec![], vec![Trivia::whitespace(" ")]);
        b.start_node("stmt");
        b.token_with_trivia(
            "ident",
            "x",
            vec![Trivia::line_comment("// keep"), Trivia::newline()],
            vec![Trivia::whitespace(" ")],
        );
        b.token_with_trivia("semi", ";", vec![], vec![Trivia::newline(), Trivia::newline()]);
        let stmt = b.finish_node();
        b.annotate(stmt, Annotation::selected());
        b.token("close", "}");
        b.finish_node();
        let tree = b.finish();

        let fragment = extract_selected_fragment(&tree).unwrap();
        assert_eq!(fragment, "// keep\nx ;");
    }

    #[test]
    fn trailing_comment_is_reattached() {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        let tok = b.token_with_trivia(
            "ident",
            "y",
            vec![],
            vec![
                Trivia::whitespace(" "),
                Trivia::line_comment("// tail"),
                Trivia::newline(),
            ],
        );
        b.annotate(tok, Annotation::selected());
        b.finish_node();
        let tree = b.finish();

        assert_eq!(extract_selected_fragment(&tree).unwrap(), "y // tail");
    }

    #[test]
    fn no_selection_yields_none() {
        let mut b = TreeBuilder::new();
        b.start_node("unit");
        b.token("ident", "z");
        b.finish_node();
        assert!(extract_selected_fragment(&b.finish()).is_none());
    }
}
