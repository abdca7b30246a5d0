//! Trivia-aware formatting with cancellation support.
//!
//! Formatting is optional, expensive post-processing: it re-indents by
//! brace depth while preserving comments and directives. The governor can
//! cancel it at any point, in which case callers fall back to
//! [`normalize`], a cheap text-level cleanup.

use tokio_util::sync::CancellationToken;

use crate::syntax::{NodeId, SyntaxTree, TriviaKind};

/// Formatting options. Indent width only, for now.
#[derive(Clone, Debug)]
pub struct FormatOptions {
    pub indent_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

impl FormatOptions {
    fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

/// Formats a tree with cancellation support.
/// Returns `None` if the cancellation token is signalled mid-render.
pub fn format_tree(
    tree: &SyntaxTree,
    options: &FormatOptions,
    cancel: &CancellationToken,
) -> Option<String> {
    let mut output = String::new();
    let mut indent_level: usize = 0;
    let mut at_line_start = true;

    render_node(
        tree,
        tree.root(),
        options,
        &mut output,
        &mut indent_level,
        &mut at_line_start,
        cancel,
    )?;

    if !output.ends_with('\n') {
        output.push('\n');
    }
    Some(output)
}

fn render_node(
    tree: &SyntaxTree,
    id: NodeId,
    options: &FormatOptions,
    output: &mut String,
    indent_level: &mut usize,
    at_line_start: &mut bool,
    cancel: &CancellationToken,
) -> Option<()> {
    if cancel.is_cancelled() {
        return None;
    }

    if !tree.is_token(id) {
        for &child in tree.children(id) {
            render_node(tree, child, options, output, indent_level, at_line_start, cancel)?;
        }
        return Some(());
    }

    render_trivia(tree.leading(id), options, output, *indent_level, at_line_start);

    let text = tree.token_text(id).as_str();
    match text {
        "{" => {
            if !*at_line_start && !output.ends_with(' ') && !output.is_empty() {
                output.push(' ');
            }
            if *at_line_start {
                output.push_str(&options.indent(*indent_level));
            }
            output.push('{');
            *indent_level += 1;
            *at_line_start = false;
        }
        "}" => {
            *indent_level = indent_level.saturating_sub(1);
            if *at_line_start {
                output.push_str(&options.indent(*indent_level));
            }
            output.push('}');
            *at_line_start = false;
        }
        _ => {
            if *at_line_start {
                output.push_str(&options.indent(*indent_level));
                *at_line_start = false;
            } else if needs_space(output, text) {
                output.push(' ');
            }
            output.push_str(text);
        }
    }

    render_trivia(tree.trailing(id), options, output, *indent_level, at_line_start);
    Some(())
}

fn render_trivia(
    trivia: &[crate::syntax::Trivia],
    options: &FormatOptions,
    output: &mut String,
    indent_level: usize,
    at_line_start: &mut bool,
) {
    for t in trivia {
        match t.kind {
            TriviaKind::Whitespace => {
                // Layout is recomputed; intra-line whitespace collapses.
            }
            TriviaKind::Newline => {
                // Cap blank runs at one empty line.
                if !output.ends_with("\n\n") {
                    output.push('\n');
                }
                *at_line_start = true;
            }
            TriviaKind::LineComment | TriviaKind::BlockComment | TriviaKind::Directive => {
                if *at_line_start {
                    output.push_str(&options.indent(indent_level));
                    *at_line_start = false;
                } else if !output.ends_with(' ') && !output.is_empty() {
                    output.push(' ');
                }
                output.push_str(&t.text);
                for _ in 0..t.newline_count() {
                    *at_line_start = true;
                }
            }
        }
    }
}

fn needs_space(output: &str, next: &str) -> bool {
    let Some(prev) = output.chars().last() else {
        return false;
    };
    if matches!(next, ";" | "," | ")" | "." | "::") {
        return false;
    }
    if matches!(prev, '(' | '.' | '\n') {
        return false;
    }
    true
}

/// Cheap fallback used once formatting has been abandoned: strips trailing
/// whitespace per line and guarantees a single trailing newline. Never
/// touches comments or token order.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
