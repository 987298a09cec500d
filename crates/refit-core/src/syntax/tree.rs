//! Positioned views over green elements
//!
//! A [`SyntaxTree`] is one immutable snapshot: an arena plus a root id. A
//! [`SyntaxNode`] is a cheap, reference-counted cursor into a tree that
//! knows its absolute offset and its parent, which is what span queries and
//! ancestor walks need. Tokens are leaf `SyntaxNode`s.

use super::arena::{Arena, GreenElement, GreenToken, NodeId};
use super::kind::SyntaxKind;
use super::trivia::Trivia;
use biome_text_size::{TextRange, TextSize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_SNAPSHOT: AtomicU64 = AtomicU64::new(1);

/// Identity of one tree snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(u64);

impl SnapshotId {
    fn next() -> Self {
        Self(NEXT_SNAPSHOT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct TreeData {
    arena: Arc<Arena>,
    root: NodeId,
    snapshot: SnapshotId,
    text: OnceLock<String>,
}

/// An immutable syntax tree snapshot
#[derive(Clone)]
pub struct SyntaxTree(Arc<TreeData>);

impl SyntaxTree {
    /// Wrap an arena and root id as a new snapshot
    pub fn new(arena: Arc<Arena>, root: NodeId) -> Self {
        Self(Arc::new(TreeData {
            arena,
            root,
            snapshot: SnapshotId::next(),
            text: OnceLock::new(),
        }))
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.0.snapshot
    }

    pub fn arena(&self) -> &Arc<Arena> {
        &self.0.arena
    }

    pub fn root_id(&self) -> NodeId {
        self.0.root
    }

    pub fn root(&self) -> SyntaxNode {
        SyntaxNode(Arc::new(NodeData {
            tree: self.clone(),
            id: self.0.root,
            offset: TextSize::from(0),
            index: 0,
            parent: None,
        }))
    }

    /// Full source text, rendered once and cached
    pub fn text(&self) -> &str {
        self.0.text.get_or_init(|| self.0.arena.render(self.0.root))
    }

    pub fn full_span(&self) -> TextRange {
        TextRange::up_to(self.0.arena.get(self.0.root).full_len())
    }

    /// Token whose full span contains `offset`
    ///
    /// At a boundary between two tokens the token starting at `offset` wins.
    /// The end of the text maps to the last token.
    pub fn find_token(&self, offset: TextSize) -> Option<SyntaxNode> {
        if offset > self.full_span().end() {
            return None;
        }
        let mut node = self.root();
        loop {
            if node.is_token() {
                return Some(node);
            }
            let mut next = None;
            let mut last = None;
            for child in node.children() {
                let span = child.full_span();
                if span.contains(offset) {
                    next = Some(child);
                    break;
                }
                if !span.is_empty() {
                    last = Some(child);
                }
            }
            node = match next {
                Some(child) => child,
                // only reachable at the very end of the text
                None if offset == node.full_span().end() => last?,
                None => return None,
            };
        }
    }

    /// Trivia item whose range contains `offset`, with the token owning it
    ///
    /// An offset at the boundary between two trivia items resolves to the
    /// one starting there.
    pub fn find_trivia(&self, offset: TextSize) -> Option<TriviaAt> {
        let token = self.find_token(offset)?;
        token
            .token_trivia()
            .into_iter()
            .find(|(range, _, _)| range.contains(offset))
            .map(|(range, trivia, leading)| TriviaAt {
                token: token.clone(),
                range,
                trivia,
                leading,
            })
    }

    /// Locate the node covering `range`
    ///
    /// Starts at the token under `range.start()` and walks up to the first
    /// node whose full span covers the range. With `innermost` false the
    /// walk continues through ancestors sharing the same full span, so ties
    /// resolve to the outermost node. A range outside the text is a
    /// contract violation.
    pub fn find_node(&self, range: TextRange, innermost: bool) -> Option<SyntaxNode> {
        if !self.full_span().contains_range(range) {
            debug_assert!(
                false,
                "find_node: {range:?} is outside of {:?}",
                self.full_span()
            );
            tracing::error!("find_node called with out-of-range span {:?}", range);
            return None;
        }
        let token = self.find_token(range.start())?;
        let mut node = token.parent()?;
        while !node.full_span().contains_range(range) {
            node = node.parent()?;
        }
        if !innermost {
            while let Some(parent) = node.parent() {
                if parent.full_span() != node.full_span() {
                    break;
                }
                node = parent;
            }
        }
        Some(node)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("snapshot", &self.0.snapshot)
            .field("len", &self.full_span().len())
            .finish()
    }
}

/// A trivia item located by [`SyntaxTree::find_trivia`]
#[derive(Debug, Clone)]
pub struct TriviaAt {
    pub token: SyntaxNode,
    pub range: TextRange,
    pub trivia: Trivia,
    pub leading: bool,
}

struct NodeData {
    tree: SyntaxTree,
    id: NodeId,
    offset: TextSize,
    index: usize,
    parent: Option<SyntaxNode>,
}

/// A node or token at a known position in a tree
#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

impl SyntaxNode {
    fn child_at(&self, index: usize, id: NodeId, offset: TextSize) -> SyntaxNode {
        SyntaxNode(Arc::new(NodeData {
            tree: self.0.tree.clone(),
            id,
            offset,
            index,
            parent: Some(self.clone()),
        }))
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.0.tree
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn green(&self) -> &GreenElement {
        self.0.tree.arena().get(self.0.id)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.green().kind()
    }

    pub fn is_token(&self) -> bool {
        matches!(self.green(), GreenElement::Token(_))
    }

    pub fn as_green_token(&self) -> Option<&GreenToken> {
        self.green().as_token()
    }

    /// Position among the parent's children
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        self.0.parent.clone()
    }

    /// Range including all leading and trailing trivia
    pub fn full_span(&self) -> TextRange {
        TextRange::at(self.0.offset, self.green().full_len())
    }

    /// Range without the outer trivia of the first and last token
    pub fn span(&self) -> TextRange {
        let full = self.full_span();
        let leading = self
            .first_token()
            .and_then(|t| t.as_green_token().map(GreenToken::leading_len))
            .unwrap_or_default();
        let trailing = self
            .last_token()
            .and_then(|t| t.as_green_token().map(GreenToken::trailing_len))
            .unwrap_or_default();
        let start = full.start() + leading;
        let end = full.end() - trailing;
        if start > end {
            // every token is empty text surrounded by trivia
            TextRange::empty(start)
        } else {
            TextRange::new(start, end)
        }
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        std::iter::successors(self.parent(), SyntaxNode::parent)
    }

    /// This node followed by its ancestors
    pub fn ancestors_and_self(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        std::iter::successors(Some(self.clone()), SyntaxNode::parent)
    }

    /// Children including tokens
    pub fn children(&self) -> SyntaxNodeChildren {
        SyntaxNodeChildren {
            parent: self.clone(),
            index: 0,
            offset: self.0.offset,
        }
    }

    pub fn child_count(&self) -> usize {
        self.green().children().len()
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode> {
        self.children().nth(index)
    }

    /// Children that are nodes
    pub fn child_nodes(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.children().filter(|c| !c.is_token())
    }

    /// Children that are tokens
    pub fn child_tokens(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.children().filter(SyntaxNode::is_token)
    }

    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode> {
        self.parent()?.child(self.index() + 1)
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode> {
        let index = self.index().checked_sub(1)?;
        self.parent()?.child(index)
    }

    /// Preorder walk over this node and every descendant, tokens included
    pub fn descendants(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        let mut stack = vec![self.clone()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
            Some(node)
        })
    }

    /// Every token under this node in source order
    pub fn descendant_tokens(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.descendants().filter(SyntaxNode::is_token)
    }

    pub fn first_token(&self) -> Option<SyntaxNode> {
        if self.is_token() {
            return Some(self.clone());
        }
        self.children().find_map(|child| child.first_token())
    }

    pub fn last_token(&self) -> Option<SyntaxNode> {
        if self.is_token() {
            return Some(self.clone());
        }
        let children: Vec<_> = self.children().collect();
        children.into_iter().rev().find_map(|child| child.last_token())
    }

    /// Token text; empty for nodes
    pub fn token_text(&self) -> &str {
        self.as_green_token().map(|t| t.text.as_str()).unwrap_or("")
    }

    /// Leading trivia of the first token
    pub fn leading_trivia(&self) -> Vec<Trivia> {
        self.first_token()
            .and_then(|t| t.as_green_token().map(|g| g.leading.clone()))
            .unwrap_or_default()
    }

    /// Trailing trivia of the last token
    pub fn trailing_trivia(&self) -> Vec<Trivia> {
        self.last_token()
            .and_then(|t| t.as_green_token().map(|g| g.trailing.clone()))
            .unwrap_or_default()
    }

    /// Text including outer trivia
    pub fn text(&self) -> String {
        self.0.tree.arena().render(self.0.id)
    }

    /// Text of [`span`](Self::span)
    pub fn trimmed_text(&self) -> String {
        let span = self.span();
        let full = self.full_span();
        let text = self.text();
        let start = usize::from(span.start() - full.start());
        let end = usize::from(span.end() - full.start());
        text[start..end].to_string()
    }

    /// Trivia of this token with absolute ranges, flagged `true` when leading
    pub fn token_trivia(&self) -> Vec<(TextRange, Trivia, bool)> {
        let Some(green) = self.as_green_token() else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(green.leading.len() + green.trailing.len());
        let mut offset = self.full_span().start();
        for trivia in &green.leading {
            out.push((TextRange::at(offset, trivia.len()), trivia.clone(), true));
            offset += trivia.len();
        }
        offset += green.text_len();
        for trivia in &green.trailing {
            out.push((TextRange::at(offset, trivia.len()), trivia.clone(), false));
            offset += trivia.len();
        }
        out
    }

    /// Absolute range of every trivia item under this node
    pub fn trivia_with_ranges(&self) -> Vec<(TextRange, Trivia)> {
        self.descendant_tokens()
            .flat_map(|token| token.token_trivia())
            .map(|(range, trivia, _)| (range, trivia))
            .collect()
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
            && self.0.offset == other.0.offset
            && self.0.tree.snapshot() == other.0.tree.snapshot()
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.tree.snapshot().hash(state);
        self.0.id.hash(state);
        self.0.offset.hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.full_span())
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Iterator over the children of a node
pub struct SyntaxNodeChildren {
    parent: SyntaxNode,
    index: usize,
    offset: TextSize,
}

impl Iterator for SyntaxNodeChildren {
    type Item = SyntaxNode;

    fn next(&mut self) -> Option<SyntaxNode> {
        let id = *self.parent.green().children().get(self.index)?;
        let child = self.parent.child_at(self.index, id, self.offset);
        self.offset += child.green().full_len();
        self.index += 1;
        Some(child)
    }
}
