//! Arena storage for green (position-independent) tree elements
//!
//! Green elements never move and are never mutated once allocated. An edit
//! allocates a new [`Arena`] layer on top of the previous one holding only
//! the elements it creates, so every untouched subtree keeps its [`NodeId`]
//! and is shared between the old and the new tree.

use super::kind::SyntaxKind;
use super::trivia::{Trivia, trivia_len};
use biome_text_size::TextSize;
use std::sync::Arc;

/// Layers deeper than this are flattened when a tree is finished
pub const MAX_ARENA_DEPTH: usize = 32;

/// Index of a green element inside an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A leaf element with its text and attached trivia
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenToken {
    pub kind: SyntaxKind,
    pub text: String,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

impl GreenToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    pub fn with_trivia(
        kind: SyntaxKind,
        text: impl Into<String>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            leading,
            trailing,
        }
    }

    pub fn text_len(&self) -> TextSize {
        TextSize::of(self.text.as_str())
    }

    pub fn leading_len(&self) -> TextSize {
        trivia_len(&self.leading)
    }

    pub fn trailing_len(&self) -> TextSize {
        trivia_len(&self.trailing)
    }

    pub fn full_len(&self) -> TextSize {
        self.leading_len() + self.text_len() + self.trailing_len()
    }

    fn render_into(&self, out: &mut String) {
        for trivia in &self.leading {
            out.push_str(&trivia.text);
        }
        out.push_str(&self.text);
        for trivia in &self.trailing {
            out.push_str(&trivia.text);
        }
    }
}

/// An interior element referencing its children by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreenNode {
    pub kind: SyntaxKind,
    pub children: Box<[NodeId]>,
    pub full_len: TextSize,
}

/// Either a node or a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreenElement {
    Node(GreenNode),
    Token(GreenToken),
}

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            GreenElement::Node(node) => node.kind,
            GreenElement::Token(token) => token.kind,
        }
    }

    pub fn full_len(&self) -> TextSize {
        match self {
            GreenElement::Node(node) => node.full_len,
            GreenElement::Token(token) => token.full_len(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match self {
            GreenElement::Node(node) => &node.children,
            GreenElement::Token(_) => &[],
        }
    }

    pub fn as_token(&self) -> Option<&GreenToken> {
        match self {
            GreenElement::Token(token) => Some(token),
            GreenElement::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&GreenNode> {
        match self {
            GreenElement::Node(node) => Some(node),
            GreenElement::Token(_) => None,
        }
    }
}

/// Append-only, layered element store
#[derive(Debug, Default)]
pub struct Arena {
    base: Option<Arc<Arena>>,
    first: u32,
    elements: Vec<GreenElement>,
    depth: usize,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new layer whose ids continue after `base`
    pub fn layer(base: Arc<Arena>) -> Self {
        Self {
            first: base.next_id(),
            depth: base.depth + 1,
            base: Some(base),
            elements: Vec::new(),
        }
    }

    /// Number of layers below this one
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of elements allocated in this layer only
    pub fn layer_len(&self) -> usize {
        self.elements.len()
    }

    fn next_id(&self) -> u32 {
        self.first + self.elements.len() as u32
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.next_id()
    }

    /// Resolve an id allocated in this arena or any layer below it
    ///
    /// Ids are only handed out by an arena, so an unknown id is a bug in
    /// the caller and panics like an out-of-bounds index.
    pub fn get(&self, id: NodeId) -> &GreenElement {
        let mut layer = self;
        while id.0 < layer.first {
            layer = match &layer.base {
                Some(base) => base,
                None => panic!("{id:?} is not allocated in this arena"),
            };
        }
        &layer.elements[(id.0 - layer.first) as usize]
    }

    pub fn alloc(&mut self, element: GreenElement) -> NodeId {
        let id = NodeId(self.next_id());
        self.elements.push(element);
        id
    }

    pub fn alloc_token(&mut self, token: GreenToken) -> NodeId {
        self.alloc(GreenElement::Token(token))
    }

    /// Allocate a node, computing its length from the children
    pub fn alloc_node(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        let full_len = children
            .iter()
            .fold(TextSize::from(0), |len, child| len + self.get(*child).full_len());
        self.alloc(GreenElement::Node(GreenNode {
            kind,
            children: children.into_boxed_slice(),
            full_len,
        }))
    }

    /// Render the full text of the subtree rooted at `id`
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::with_capacity(u32::from(self.get(id).full_len()) as usize);
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        match self.get(id) {
            GreenElement::Token(token) => token.render_into(out),
            GreenElement::Node(node) => {
                for child in node.children.iter() {
                    self.render_into(*child, out);
                }
            }
        }
    }

    /// Copy the subtree reachable from `root` into a fresh single-layer arena
    pub fn compact(&self, root: NodeId) -> (Arena, NodeId) {
        let mut target = Arena::new();
        let new_root = self.copy_into(root, &mut target);
        (target, new_root)
    }

    fn copy_into(&self, id: NodeId, target: &mut Arena) -> NodeId {
        match self.get(id) {
            GreenElement::Token(token) => target.alloc_token(token.clone()),
            GreenElement::Node(node) => {
                let children = node
                    .children
                    .iter()
                    .map(|child| self.copy_into(*child, target))
                    .collect();
                target.alloc_node(node.kind, children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::trivia::Trivia;

    #[test]
    fn test_layers_share_ids() {
        let mut base = Arena::new();
        let a = base.alloc_token(GreenToken::new(SyntaxKind::Identifier, "a"));
        let base = Arc::new(base);

        let mut layer = Arena::layer(base.clone());
        let b = layer.alloc_token(GreenToken::new(SyntaxKind::Identifier, "b"));
        let node = layer.alloc_node(SyntaxKind::AddExpression, vec![a, b]);

        assert_eq!(layer.depth(), 1);
        assert_eq!(layer.layer_len(), 2);
        assert_eq!(layer.get(a), base.get(a));
        assert!(!base.contains(b));
        assert_eq!(layer.render(node), "ab");
    }

    #[test]
    fn test_node_length_includes_trivia() {
        let mut arena = Arena::new();
        let token = arena.alloc_token(GreenToken::with_trivia(
            SyntaxKind::Identifier,
            "x",
            vec![Trivia::whitespace("  ")],
            vec![Trivia::end_of_line("\n")],
        ));
        let node = arena.alloc_node(SyntaxKind::IdentifierName, vec![token]);
        assert_eq!(arena.get(node).full_len(), TextSize::from(4));
        assert_eq!(arena.render(node), "  x\n");
    }

    #[test]
    fn test_compact_preserves_text() {
        let mut base = Arena::new();
        let a = base.alloc_token(GreenToken::new(SyntaxKind::Identifier, "a"));
        let mut layer = Arena::layer(Arc::new(base));
        let plus = layer.alloc_token(GreenToken::new(SyntaxKind::Plus, "+"));
        let root = layer.alloc_node(SyntaxKind::AddExpression, vec![a, plus, a]);

        let (flat, new_root) = layer.compact(root);
        assert_eq!(flat.depth(), 0);
        assert_eq!(flat.render(new_root), "a+a");
    }
}
