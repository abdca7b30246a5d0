//! Trivia re-anchoring across a conversion.
//!
//! Conversion reshapes structure: wrappers appear, statements reorder, one
//! construct becomes several tokens. Nearest-node attachment misplaces
//! comments as soon as that happens, so re-anchoring is line-bucketed and
//! direction-sensitive instead. The Node Converter pre-tags converted
//! elements with "corresponds to original source line L" start/end claims;
//! this engine buckets those claims, walks source lines **last to first**
//! (trivia must never move past structural tokens such as block openers or
//! directives), queues significant trivia until an anchored line is found,
//! and applies everything in one batched ID-indexed rewrite.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::syntax::annotations;
use crate::syntax::rewrite::TreeEdit;
use crate::syntax::{NodeId, SyntaxTree, Trivia};

#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("target tree has no tokens to anchor trivia to")]
    EmptyTarget,
}

/// Re-attaches the source tree's comments and directives to the converted
/// target tree. Returns a successor of `target`; neither input is mutated.
pub fn reanchor(source: &SyntaxTree, target: &SyntaxTree) -> Result<SyntaxTree, TriviaError> {
    // Fast path: nothing significant to carry over, zero attachments.
    if source.has_no_significant_trivia() {
        return Ok(target.clone());
    }

    let target_tokens = target.tokens();
    if target_tokens.is_empty() {
        return Err(TriviaError::EmptyTarget);
    }

    let anchors = AnchorTable::build(target);
    let by_line = source_lines(source);

    // Attachment lists are built back-to-front during the reverse sweep and
    // put into natural order before the rewrite.
    let mut leading_blocks: FxHashMap<NodeId, Vec<Vec<Trivia>>> = FxHashMap::default();
    let mut trailing_blocks: FxHashMap<NodeId, Vec<Vec<Trivia>>> = FxHashMap::default();
    let mut pending_leading: Vec<Vec<Trivia>> = Vec::new();
    let mut pending_trailing: Vec<Vec<Trivia>> = Vec::new();

    for (&line, &(first, last)) in by_line.iter().rev() {
        let trail = significant(source.trailing(last));
        if !trail.is_empty() {
            pending_trailing.push(trail);
        }
        if !pending_trailing.is_empty() {
            if let Some(anchor) = anchors.trailing.get(&line) {
                trailing_blocks
                    .entry(anchor.token)
                    .or_default()
                    .append(&mut pending_trailing);
            }
        }

        let lead = significant(source.leading(first));
        if !lead.is_empty() {
            pending_leading.push(lead);
        }
        if !pending_leading.is_empty() {
            if let Some(anchor) = anchors.leading.get(&line) {
                leading_blocks
                    .entry(anchor.token)
                    .or_default()
                    .append(&mut pending_leading);
            }
        }
    }

    // Trivia below every anchored line still belongs to the document.
    if !pending_leading.is_empty() || !pending_trailing.is_empty() {
        let first = target_tokens[0];
        let entry = leading_blocks.entry(first).or_default();
        entry.append(&mut pending_leading);
        entry.append(&mut pending_trailing);
    }

    let mut edit = TreeEdit::new();

    for (token, mut blocks) in leading_blocks {
        blocks.reverse();
        let mut list = Vec::new();
        for block in blocks {
            for piece in block {
                list.push(piece);
                list.push(Trivia::newline());
            }
        }
        edit.prepend_leading(token, list);
    }

    // Trailing lists may embed at most one newline after formatting; split
    // off everything past the first and move it to the next token's lead.
    let token_index: FxHashMap<NodeId, usize> = target_tokens
        .iter()
        .enumerate()
        .map(|(i, &t)| (t, i))
        .collect();
    for (token, mut blocks) in trailing_blocks {
        blocks.reverse();
        let mut list = Vec::new();
        for (i, block) in blocks.into_iter().enumerate() {
            if i > 0 {
                list.push(Trivia::newline());
            }
            for piece in block {
                list.push(Trivia::whitespace(" "));
                list.push(piece);
            }
        }
        let (keep, spill) = split_after_first_newline(list);
        if !spill.is_empty() {
            let next = token_index
                .get(&token)
                .and_then(|&i| target_tokens.get(i + 1))
                .copied();
            match next {
                Some(next_token) => {
                    let mut lead = Vec::new();
                    for piece in spill {
                        if piece.is_significant() {
                            lead.push(piece);
                            lead.push(Trivia::newline());
                        }
                    }
                    edit.prepend_leading(next_token, lead);
                }
                None => edit.append_trailing(token, spill),
            }
        }
        let mut merged = keep;
        merged.push(Trivia::newline());
        let mut full = merged;
        full.extend(target.trailing(token).iter().cloned());
        dedup_adjacent_newlines(&mut full);
        edit.replace_trailing(token, full);
    }

    debug!(attachments = edit.touched(), "re-anchored source trivia");
    Ok(edit.apply(target))
}

struct Anchor {
    token: NodeId,
}

/// Per claimed source line: the target token on the earliest-starting
/// target line (leading side) and on the latest-ending line (trailing).
struct AnchorTable {
    leading: FxHashMap<u32, Anchor>,
    trailing: FxHashMap<u32, Anchor>,
}

impl AnchorTable {
    fn build(target: &SyntaxTree) -> Self {
        let target_lines = target.token_lines();
        let mut leading: FxHashMap<u32, (NodeId, u32)> = FxHashMap::default();
        let mut trailing: FxHashMap<u32, (NodeId, u32)> = FxHashMap::default();

        for id in target.preorder(target.root()) {
            if let Some(line) = annotations::origin_start(target, id) {
                if let Some(token) = target.first_token(id) {
                    let target_line = target_lines[&token];
                    leading
                        .entry(line)
                        .and_modify(|best| {
                            if target_line < best.1 {
                                *best = (token, target_line);
                            }
                        })
                        .or_insert((token, target_line));
                }
            }
            if let Some(line) = annotations::origin_end(target, id) {
                if let Some(token) = target.last_token(id) {
                    let target_line = target_lines[&token];
                    trailing
                        .entry(line)
                        .and_modify(|best| {
                            if target_line > best.1 {
                                *best = (token, target_line);
                            }
                        })
                        .or_insert((token, target_line));
                }
            }
        }

        Self {
            leading: leading
                .into_iter()
                .map(|(l, (token, _))| (l, Anchor { token }))
                .collect(),
            trailing: trailing
                .into_iter()
                .map(|(l, (token, _))| (l, Anchor { token }))
                .collect(),
        }
    }
}

/// First and last token of every populated source line.
fn source_lines(source: &SyntaxTree) -> BTreeMap<u32, (NodeId, NodeId)> {
    let lines = source.token_lines();
    let mut by_line: BTreeMap<u32, (NodeId, NodeId)> = BTreeMap::new();
    for token in source.tokens() {
        let line = lines[&token];
        by_line
            .entry(line)
            .and_modify(|(_, last)| *last = token)
            .or_insert((token, token));
    }
    by_line
}

fn significant(trivia: &[Trivia]) -> Vec<Trivia> {
    trivia
        .iter()
        .filter(|t| t.is_significant())
        .cloned()
        .collect()
}

fn split_after_first_newline(list: Vec<Trivia>) -> (Vec<Trivia>, Vec<Trivia>) {
    if let Some(pos) = list.iter().position(|t| t.newline_count() > 0) {
        if pos + 1 < list.len() {
            let mut keep = list;
            let spill = keep.split_off(pos + 1);
            return (keep, spill);
        }
    }
    (list, Vec::new())
}

fn dedup_adjacent_newlines(list: &mut Vec<Trivia>) {
    let mut i = 1;
    while i < list.len() {
        if list[i].newline_count() > 0
            && !list[i].is_significant()
            && list[i - 1].newline_count() > 0
            && !list[i - 1].is_significant()
        {
            list.remove(i);
        } else {
            i += 1;
        }
    }
}
