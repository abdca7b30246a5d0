//! Source-unit fixtures for orchestrator tests.

use std::path::PathBuf;

use codeport::syntax::{SyntaxTree, TreeBuilder, Trivia};
use codeport::SourceUnit;

/// Builds a one-identifier-per-statement source tree:
/// each entry becomes `<ident>;` on its own line.
pub fn statements_tree(idents: &[&str]) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.start_node("unit");
    for ident in idents {
        b.start_node("stmt");
        b.token("ident", *ident);
        b.token_with_trivia("semi", ";", vec![], vec![Trivia::newline()]);
        b.finish_node();
    }
    b.finish_node();
    b.finish()
}

pub fn unit(path: &str, idents: &[&str]) -> SourceUnit {
    let tree = statements_tree(idents);
    SourceUnit {
        path: PathBuf::from(path),
        project: "app".to_string(),
        text: tree.text(),
        tree,
    }
}

/// A source unit whose first statement carries a leading comment.
pub fn unit_with_comment(path: &str, comment: &str, ident: &str) -> SourceUnit {
    let mut b = TreeBuilder::new();
    b.start_node("unit");
    b.start_node("stmt");
    b.token_with_trivia(
        "ident",
        ident,
        vec![Trivia::line_comment(comment), Trivia::newline()],
        vec![],
    );
    b.token_with_trivia("semi", ";", vec![], vec![Trivia::newline()]);
    b.finish_node();
    b.finish_node();
    let tree = b.finish();
    SourceUnit {
        path: PathBuf::from(path),
        project: "app".to_string(),
        text: tree.text(),
        tree,
    }
}
