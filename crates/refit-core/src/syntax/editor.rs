//! Building new trees out of an existing snapshot
//!
//! A [`TreeEditor`] owns a fresh arena layer on top of a tree's arena.
//! Everything it creates lands in that layer, and any [`NodeId`] of the base
//! tree can be reused as a child without copying. Replacing a node copies
//! only the root-to-node path; [`TreeEditor::finish`] turns a new root id
//! into a new [`SyntaxTree`] snapshot.

use super::arena::{Arena, GreenElement, GreenToken, MAX_ARENA_DEPTH, NodeId};
use super::kind::SyntaxKind;
use super::tree::{SyntaxNode, SyntaxTree};
use super::lexer::lex_trivia;
use super::trivia::{Trivia, render};
use crate::edit::TextEdit;
use crate::error::RefitError;
use crate::result::Result;
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug)]
pub struct TreeEditor {
    base: SyntaxTree,
    arena: Arena,
}

impl TreeEditor {
    pub fn new(tree: &SyntaxTree) -> Self {
        Self {
            base: tree.clone(),
            arena: Arena::layer(tree.arena().clone()),
        }
    }

    /// The snapshot this editor builds on
    pub fn base(&self) -> &SyntaxTree {
        &self.base
    }

    pub fn get(&self, id: NodeId) -> &GreenElement {
        self.arena.get(id)
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.get(id).kind()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).children().to_vec()
    }

    /// Rendered text of an element, trivia included
    pub fn text(&self, id: NodeId) -> String {
        self.arena.render(id)
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    pub fn token(&mut self, kind: SyntaxKind, text: impl Into<String>) -> NodeId {
        self.arena.alloc_token(GreenToken::new(kind, text))
    }

    /// Token with its fixed keyword or punctuation text
    pub fn fixed_token(&mut self, kind: SyntaxKind) -> NodeId {
        let text = kind.fixed_text().unwrap_or_default();
        self.token(kind, text)
    }

    pub fn token_with_trivia(
        &mut self,
        kind: SyntaxKind,
        text: impl Into<String>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> NodeId {
        self.arena
            .alloc_token(GreenToken::with_trivia(kind, text, leading, trailing))
    }

    pub fn node(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        self.arena.alloc_node(kind, children)
    }

    // ------------------------------------------------------------------
    // Trivia
    // ------------------------------------------------------------------

    pub fn first_token(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id) {
            GreenElement::Token(_) => Some(id),
            GreenElement::Node(node) => node.children.iter().find_map(|c| self.first_token(*c)),
        }
    }

    pub fn last_token(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id) {
            GreenElement::Token(_) => Some(id),
            GreenElement::Node(node) => {
                node.children.iter().rev().find_map(|c| self.last_token(*c))
            }
        }
    }

    pub fn leading_trivia(&self, id: NodeId) -> Vec<Trivia> {
        self.first_token(id)
            .and_then(|t| self.get(t).as_token().map(|g| g.leading.clone()))
            .unwrap_or_default()
    }

    pub fn trailing_trivia(&self, id: NodeId) -> Vec<Trivia> {
        self.last_token(id)
            .and_then(|t| self.get(t).as_token().map(|g| g.trailing.clone()))
            .unwrap_or_default()
    }

    pub fn with_leading_trivia(&mut self, id: NodeId, trivia: Vec<Trivia>) -> NodeId {
        self.map_edge_token(id, Edge::First, &mut |token| GreenToken {
            leading: trivia.clone(),
            ..token.clone()
        })
    }

    pub fn with_trailing_trivia(&mut self, id: NodeId, trivia: Vec<Trivia>) -> NodeId {
        self.map_edge_token(id, Edge::Last, &mut |token| GreenToken {
            trailing: trivia.clone(),
            ..token.clone()
        })
    }

    pub fn without_leading_trivia(&mut self, id: NodeId) -> NodeId {
        self.with_leading_trivia(id, Vec::new())
    }

    pub fn without_trailing_trivia(&mut self, id: NodeId) -> NodeId {
        self.with_trailing_trivia(id, Vec::new())
    }

    pub fn without_trivia(&mut self, id: NodeId) -> NodeId {
        let id = self.without_leading_trivia(id);
        self.without_trailing_trivia(id)
    }

    /// Copy the outer trivia of `from` onto `id`
    pub fn with_trivia_from(&mut self, id: NodeId, from: NodeId) -> NodeId {
        let leading = self.leading_trivia(from);
        let trailing = self.trailing_trivia(from);
        let id = self.with_leading_trivia(id, leading);
        self.with_trailing_trivia(id, trailing)
    }

    fn map_edge_token(
        &mut self,
        id: NodeId,
        edge: Edge,
        f: &mut dyn FnMut(&GreenToken) -> GreenToken,
    ) -> NodeId {
        match self.get(id).clone() {
            GreenElement::Token(token) => self.arena.alloc_token(f(&token)),
            GreenElement::Node(node) => {
                let mut indices: Box<dyn Iterator<Item = usize>> = match edge {
                    Edge::First => Box::new(0..node.children.len()),
                    Edge::Last => Box::new((0..node.children.len()).rev()),
                };
                let Some(index) = indices.find(|&i| self.first_token(node.children[i]).is_some())
                else {
                    return id;
                };
                let child = self.map_edge_token(node.children[index], edge, f);
                self.with_child(id, index, child)
            }
        }
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// New node equal to `parent` with the child at `index` replaced
    pub fn with_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> NodeId {
        self.splice_children(parent, index..index + 1, vec![child])
    }

    /// New node equal to `parent` with `range` of its children replaced
    pub fn splice_children(
        &mut self,
        parent: NodeId,
        range: Range<usize>,
        replacement: Vec<NodeId>,
    ) -> NodeId {
        let kind = self.kind(parent);
        let mut children = self.children(parent);
        children.splice(range, replacement);
        self.arena.alloc_node(kind, children)
    }

    /// Replace `target` with `replacement`, returning the new root id
    pub fn replace_node(&mut self, target: &SyntaxNode, replacement: NodeId) -> Result<NodeId> {
        self.check_snapshot(target)?;
        Ok(self.rebuild_ancestors(target, replacement))
    }

    /// Replace the contiguous siblings `first..=last` with `replacement`
    pub fn replace_range(
        &mut self,
        first: &SyntaxNode,
        last: &SyntaxNode,
        replacement: Vec<NodeId>,
    ) -> Result<NodeId> {
        self.check_snapshot(first)?;
        self.check_snapshot(last)?;
        let (Some(parent), Some(last_parent)) = (first.parent(), last.parent()) else {
            return Err(RefitError::invalid_edit("cannot replace the root as a range"));
        };
        if parent != last_parent || first.index() > last.index() {
            return Err(RefitError::invalid_edit(
                "range replacement needs ordered siblings of one parent",
            ));
        }
        let new_parent =
            self.splice_children(parent.id(), first.index()..last.index() + 1, replacement);
        Ok(self.rebuild_ancestors(&parent, new_parent))
    }

    /// Apply a text edit confined to one token's leading or trailing trivia
    ///
    /// The edited trivia is re-lexed, so the edit may not introduce tokens.
    pub fn edit_trivia(&mut self, edit: &TextEdit) -> Result<NodeId> {
        let outside = || RefitError::invalid_edit(format!("{:?} is not inside trivia", edit.range));
        let token = self.base.find_token(edit.range.start()).ok_or_else(outside)?;
        let green = token.as_green_token().ok_or_else(outside)?.clone();
        let full = token.full_span();
        let text_start = full.start() + green.leading_len();
        let text_end = text_start + green.text_len();

        let (leading, trailing) = if edit.range.end() <= text_start {
            let local = edit.relative_to(full.start()).ok_or_else(outside)?;
            (lex_trivia(&local.apply(&render(&green.leading))?)?, green.trailing)
        } else if edit.range.start() >= text_end && edit.range.end() <= full.end() {
            let local = edit.relative_to(text_end).ok_or_else(outside)?;
            (green.leading, lex_trivia(&local.apply(&render(&green.trailing))?)?)
        } else {
            return Err(outside());
        };
        let replacement = self.token_with_trivia(green.kind, green.text, leading, trailing);
        self.replace_node(&token, replacement)
    }

    fn rebuild_ancestors(&mut self, target: &SyntaxNode, replacement: NodeId) -> NodeId {
        let mut current = replacement;
        let mut node = target.clone();
        while let Some(parent) = node.parent() {
            current = self.with_child(parent.id(), node.index(), current);
            node = parent;
        }
        current
    }

    fn check_snapshot(&self, node: &SyntaxNode) -> Result<()> {
        let found = node.tree().snapshot();
        let expected = self.base.snapshot();
        if found != expected {
            return Err(RefitError::StaleTree {
                expected: expected.get(),
                found: found.get(),
            });
        }
        Ok(())
    }

    /// Seal the layer and wrap `root` as a new snapshot
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        if self.arena.depth() > MAX_ARENA_DEPTH {
            tracing::debug!(depth = self.arena.depth(), "Compacting arena layers");
            let (flat, root) = self.arena.compact(root);
            return SyntaxTree::new(Arc::new(flat), root);
        }
        SyntaxTree::new(Arc::new(self.arena), root)
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    First,
    Last,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::TextEdit;
    use crate::syntax::parse;

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> SyntaxNode {
        tree.root().descendants().find(|n| n.kind() == kind).unwrap()
    }

    #[test]
    fn test_replace_node_shares_untouched_subtrees() {
        let tree = parse("class C { int a; void M() { x = 1; } }").unwrap();
        let field = find(&tree, SyntaxKind::FieldDeclaration);
        let literal = find(&tree, SyntaxKind::NumericLiteralExpression);

        let mut editor = TreeEditor::new(&tree);
        let two = editor.token_with_trivia(SyntaxKind::NumericLiteral, "2", vec![], vec![]);
        let two = editor.node(SyntaxKind::NumericLiteralExpression, vec![two]);
        let two = editor.with_trivia_from(two, literal.id());
        let root = editor.replace_node(&literal, two).unwrap();
        let new_tree = editor.finish(root);

        assert_eq!(new_tree.text(), "class C { int a; void M() { x = 2; } }");
        assert_eq!(tree.text(), "class C { int a; void M() { x = 1; } }");
        assert_ne!(new_tree.snapshot(), tree.snapshot());

        let new_field = find(&new_tree, SyntaxKind::FieldDeclaration);
        assert_eq!(new_field.id(), field.id());
    }

    #[test]
    fn test_trivia_helpers() {
        let tree = parse("class C { void M() {\n /* a */ x = 1; // b\n } }").unwrap();
        let statement = find(&tree, SyntaxKind::ExpressionStatement);

        let mut editor = TreeEditor::new(&tree);
        let leading = editor.leading_trivia(statement.id());
        assert!(leading.iter().any(Trivia::is_comment));

        let bare = editor.without_trivia(statement.id());
        assert_eq!(editor.text(bare), "x = 1;");

        let spaced = editor.with_leading_trivia(bare, vec![Trivia::space()]);
        assert_eq!(editor.text(spaced), " x = 1;");
    }

    #[test]
    fn test_replace_range_is_atomic() {
        let tree = parse("class C { void M() { a(); b(); c(); } }").unwrap();
        let block = find(&tree, SyntaxKind::Block);
        let statements: Vec<_> = block.child_nodes().collect();

        let mut editor = TreeEditor::new(&tree);
        let root = editor
            .replace_range(&statements[0], &statements[1], vec![statements[2].id()])
            .unwrap();
        let new_tree = editor.finish(root);
        assert_eq!(new_tree.text(), "class C { void M() { c(); c(); } }");
    }

    #[test]
    fn test_replace_range_rejects_foreign_siblings() {
        let tree = parse("class C { void M() { a(); } void N() { b(); } }").unwrap();
        let statements: Vec<_> = tree
            .root()
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::ExpressionStatement)
            .collect();

        let mut editor = TreeEditor::new(&tree);
        let err = editor
            .replace_range(&statements[0], &statements[1], vec![])
            .unwrap_err();
        assert!(matches!(err, RefitError::InvalidEdit { .. }));
    }

    #[test]
    fn test_stale_node_is_rejected() {
        let old = parse("class C { }").unwrap();
        let new = parse("class C { }").unwrap();
        let mut editor = TreeEditor::new(&new);
        let node = old.root().child(0).unwrap();
        let replacement = node.id();
        let err = editor.replace_node(&node, replacement).unwrap_err();
        assert!(matches!(err, RefitError::StaleTree { .. }));
    }

    #[test]
    fn test_edit_trivia_relexes_comments() {
        let text = "class C {\n    // gone\n    int a; // kept\n}";
        let tree = parse(text).unwrap();
        let start = text.find("    // gone").unwrap();
        let end = start + "    // gone\n".len();

        let mut editor = TreeEditor::new(&tree);
        let root = editor
            .edit_trivia(&TextEdit::replace_range(start..end, ""))
            .unwrap();
        let new_tree = editor.finish(root);
        assert_eq!(new_tree.text(), "class C {\n    int a; // kept\n}");

        let mut editor = TreeEditor::new(&tree);
        let semicolon = text.find(';').unwrap();
        let err = editor
            .edit_trivia(&TextEdit::replace_range(semicolon - 1..semicolon + 2, ""))
            .unwrap_err();
        assert!(matches!(err, RefitError::InvalidEdit { .. }));
    }

    #[test]
    fn test_deep_layers_are_compacted() {
        let mut tree = parse("class C { int a; }").unwrap();
        for _ in 0..=MAX_ARENA_DEPTH {
            let name = tree
                .root()
                .descendants()
                .find(|n| n.kind() == SyntaxKind::Identifier && n.token_text() == "a")
                .unwrap();
            let mut editor = TreeEditor::new(&tree);
            let replacement = editor.with_trivia_from(name.id(), name.id());
            let root = editor.replace_node(&name, replacement).unwrap();
            tree = editor.finish(root);
        }
        assert!(tree.arena().depth() <= MAX_ARENA_DEPTH);
        assert_eq!(tree.text(), "class C { int a; }");
    }
}
