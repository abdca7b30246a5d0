//! Arena syntax tree with stable node IDs.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::syntax::annotations::Annotation;

/// Stable identifier of one element in a [`SyntaxTree`] arena.
///
/// IDs are assigned at build time and survive annotation updates and
/// trivia/text edits. They are the only key used for element lookup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// Trivia classification. Whitespace and newlines are layout-only;
/// comments and directives are significant and must survive conversion.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    Directive,
}

/// One piece of non-semantic source text attached to a token.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: SmolStr,
}

impl Trivia {
    pub fn whitespace(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: TriviaKind::Whitespace,
            text: text.into(),
        }
    }

    pub fn newline() -> Self {
        Self {
            kind: TriviaKind::Newline,
            text: SmolStr::new_static("\n"),
        }
    }

    pub fn line_comment(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: TriviaKind::LineComment,
            text: text.into(),
        }
    }

    pub fn block_comment(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: TriviaKind::BlockComment,
            text: text.into(),
        }
    }

    pub fn directive(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: TriviaKind::Directive,
            text: text.into(),
        }
    }

    /// Comments and directives are significant; layout trivia is not.
    pub fn is_significant(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::LineComment | TriviaKind::BlockComment | TriviaKind::Directive
        )
    }

    pub fn newline_count(&self) -> usize {
        self.text.matches('\n').count()
    }
}

/// One arena slot: an inner node or a token.
#[derive(Clone, Debug)]
pub enum Element {
    Node {
        kind: SmolStr,
        children: Vec<NodeId>,
        annotations: Vec<Annotation>,
    },
    Token {
        kind: SmolStr,
        text: SmolStr,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
        annotations: Vec<Annotation>,
    },
}

/// Immutable-by-convention syntax tree.
///
/// Structure never changes after build; annotations may be appended (they
/// carry diagnostics, not semantics) and [`rewrite::TreeEdit`] produces
/// successor trees with the same IDs.
///
/// [`rewrite::TreeEdit`]: crate::syntax::rewrite::TreeEdit
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    pub(crate) elements: Vec<Element>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn is_token(&self, id: NodeId) -> bool {
        matches!(self.element(id), Element::Token { .. })
    }

    pub fn kind(&self, id: NodeId) -> &SmolStr {
        match self.element(id) {
            Element::Node { kind, .. } | Element::Token { kind, .. } => kind,
        }
    }

    /// Token text, without trivia. Panics if `id` is an inner node.
    pub fn token_text(&self, id: NodeId) -> &SmolStr {
        match self.element(id) {
            Element::Token { text, .. } => text,
            Element::Node { .. } => panic!("token_text on inner node"),
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.element(id) {
            Element::Node { children, .. } => children,
            Element::Token { .. } => &[],
        }
    }

    pub fn annotations(&self, id: NodeId) -> &[Annotation] {
        match self.element(id) {
            Element::Node { annotations, .. } | Element::Token { annotations, .. } => annotations,
        }
    }

    /// Appends a diagnostic annotation. Structure is unaffected.
    pub fn push_annotation(&mut self, id: NodeId, annotation: Annotation) {
        match &mut self.elements[id.index()] {
            Element::Node { annotations, .. } | Element::Token { annotations, .. } => {
                annotations.push(annotation);
            }
        }
    }

    pub fn leading(&self, id: NodeId) -> &[Trivia] {
        match self.element(id) {
            Element::Token { leading, .. } => leading,
            Element::Node { .. } => &[],
        }
    }

    pub fn trailing(&self, id: NodeId) -> &[Trivia] {
        match self.element(id) {
            Element::Token { trailing, .. } => trailing,
            Element::Node { .. } => &[],
        }
    }

    /// All elements of the subtree rooted at `id`, preorder.
    pub fn preorder(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            for &child in self.children(cur).iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Tokens of the subtree rooted at `id`, in source order.
    pub fn tokens_of(&self, id: NodeId) -> Vec<NodeId> {
        self.preorder(id)
            .into_iter()
            .filter(|&e| self.is_token(e))
            .collect()
    }

    /// All tokens of the tree, in source order.
    pub fn tokens(&self) -> Vec<NodeId> {
        self.tokens_of(self.root)
    }

    pub fn first_token(&self, id: NodeId) -> Option<NodeId> {
        if self.is_token(id) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .find_map(|&c| self.first_token(c))
    }

    pub fn last_token(&self, id: NodeId) -> Option<NodeId> {
        if self.is_token(id) {
            return Some(id);
        }
        self.children(id)
            .iter()
            .rev()
            .find_map(|&c| self.last_token(c))
    }

    /// Renders the tree back to text: leading trivia, token text, trailing
    /// trivia, in order. Lossless with respect to how the tree was built.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.write_subtree(self.root, &mut out);
        out
    }

    /// Renders only the subtree rooted at `id`.
    pub fn subtree_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_subtree(id, &mut out);
        out
    }

    fn write_subtree(&self, id: NodeId, out: &mut String) {
        for token in self.tokens_of(id) {
            for t in self.leading(token) {
                out.push_str(&t.text);
            }
            out.push_str(self.token_text(token));
            for t in self.trailing(token) {
                out.push_str(&t.text);
            }
        }
    }

    /// Maps every token to the 0-based line on which its own text starts,
    /// counting newlines embedded in trivia and token text alike.
    pub fn token_lines(&self) -> FxHashMap<NodeId, u32> {
        let mut lines = FxHashMap::default();
        let mut line = 0u32;
        for token in self.tokens() {
            for t in self.leading(token) {
                line += t.newline_count() as u32;
            }
            lines.insert(token, line);
            line += self.token_text(token).matches('\n').count() as u32;
            for t in self.trailing(token) {
                line += t.newline_count() as u32;
            }
        }
        lines
    }

    /// True if no token in the tree carries a comment or directive.
    pub fn has_no_significant_trivia(&self) -> bool {
        self.tokens().iter().all(|&t| {
            self.leading(t).iter().all(|tr| !tr.is_significant())
                && self.trailing(t).iter().all(|tr| !tr.is_significant())
        })
    }
}

/// Builds a [`SyntaxTree`] in document order.
///
/// Usage mirrors a green-tree builder: `start_node`, `token`, `finish_node`.
/// Both `token` and `finish_node` return the stable ID of the element they
/// created, so callers can annotate as they build.
pub struct TreeBuilder {
    elements: Vec<Element>,
    stack: Vec<Frame>,
    root: Option<NodeId>,
}

struct Frame {
    kind: SmolStr,
    children: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            stack: Vec::new(),
            root: None,
        }
    }

    fn push(&mut self, element: Element) -> NodeId {
        let id = NodeId(self.elements.len() as u32);
        self.elements.push(element);
        id
    }

    pub fn start_node(&mut self, kind: impl Into<SmolStr>) {
        self.stack.push(Frame {
            kind: kind.into(),
            children: Vec::new(),
        });
    }

    pub fn token(&mut self, kind: impl Into<SmolStr>, text: impl Into<SmolStr>) -> NodeId {
        self.token_with_trivia(kind, text, Vec::new(), Vec::new())
    }

    pub fn token_with_trivia(
        &mut self,
        kind: impl Into<SmolStr>,
        text: impl Into<SmolStr>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> NodeId {
        let id = self.push(Element::Token {
            kind: kind.into(),
            text: text.into(),
            leading,
            trailing,
            annotations: Vec::new(),
        });
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(id);
        }
        id
    }

    pub fn finish_node(&mut self) -> NodeId {
        let frame = self.stack.pop().expect("finish_node without start_node");
        let id = self.push(Element::Node {
            kind: frame.kind,
            children: frame.children,
            annotations: Vec::new(),
        });
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.root = Some(id),
        }
        id
    }

    pub fn annotate(&mut self, id: NodeId, annotation: Annotation) {
        match &mut self.elements[id.index()] {
            Element::Node { annotations, .. } | Element::Token { annotations, .. } => {
                annotations.push(annotation);
            }
        }
    }

    pub fn finish(self) -> SyntaxTree {
        let root = self.root.expect("finish before any node was completed");
        debug_assert!(self.stack.is_empty(), "unbalanced start_node/finish_node");
        SyntaxTree {
            elements: self.elements,
            root,
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
