//! Bottom-up construction of green trees

use super::arena::{Arena, GreenToken, NodeId};
use super::kind::SyntaxKind;
use super::tree::SyntaxTree;
use std::sync::Arc;

/// Marks a position that a node can later be wrapped around
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint(usize);

/// Event-style builder: start a node, push tokens, finish the node
#[derive(Debug, Default)]
pub struct TreeBuilder {
    arena: Arena,
    parents: Vec<(SyntaxKind, usize)>,
    children: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.parents.push((kind, self.children.len()));
    }

    pub fn finish_node(&mut self) {
        let Some((kind, first_child)) = self.parents.pop() else {
            panic!("finish_node called without a matching start_node");
        };
        let children = self.children.split_off(first_child);
        let id = self.arena.alloc_node(kind, children);
        self.children.push(id);
    }

    /// Push a token without trivia
    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        self.push_token(GreenToken::new(kind, text));
    }

    pub fn push_token(&mut self, token: GreenToken) {
        let id = self.arena.alloc_token(token);
        self.children.push(id);
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.children.len())
    }

    /// Start a node whose first child is whatever was pushed after `checkpoint`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let Checkpoint(position) = checkpoint;
        assert!(
            position <= self.children.len(),
            "checkpoint no longer valid, was a node finished past it?"
        );
        if let Some(&(_, first_child)) = self.parents.last() {
            assert!(
                position >= first_child,
                "checkpoint precedes the currently open node"
            );
        }
        self.parents.push((kind, position));
    }

    /// Complete the tree; exactly one root node must remain
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.parents.is_empty(), "unfinished nodes left in builder");
        assert_eq!(self.children.len(), 1, "builder must produce a single root");
        let root = self.children.remove(0);
        SyntaxTree::new(Arc::new(self.arena), root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::trivia::Trivia;

    #[test]
    fn test_build_and_render() {
        let mut builder = TreeBuilder::new();
        builder.start_node(SyntaxKind::CompilationUnit);
        builder.start_node(SyntaxKind::IdentifierName);
        builder.push_token(GreenToken::with_trivia(
            SyntaxKind::Identifier,
            "value",
            vec![Trivia::whitespace("  ")],
            vec![Trivia::end_of_line("\n")],
        ));
        builder.finish_node();
        builder.token(SyntaxKind::EndOfFile, "");
        builder.finish_node();

        let tree = builder.finish();
        assert_eq!(tree.text(), "  value\n");

        let name = tree.root().child(0).unwrap();
        assert_eq!(name.kind(), SyntaxKind::IdentifierName);
        assert_eq!(u32::from(name.span().start()), 2);
        assert_eq!(u32::from(name.span().end()), 7);
        assert_eq!(name.trimmed_text(), "value");
    }

    #[test]
    fn test_checkpoint_wraps_previous_children() {
        let mut builder = TreeBuilder::new();
        builder.start_node(SyntaxKind::CompilationUnit);
        let checkpoint = builder.checkpoint();
        builder.start_node(SyntaxKind::IdentifierName);
        builder.token(SyntaxKind::Identifier, "a");
        builder.finish_node();
        builder.start_node_at(checkpoint, SyntaxKind::AddExpression);
        builder.token(SyntaxKind::Plus, "+");
        builder.start_node(SyntaxKind::IdentifierName);
        builder.token(SyntaxKind::Identifier, "b");
        builder.finish_node();
        builder.finish_node();
        builder.token(SyntaxKind::EndOfFile, "");
        builder.finish_node();

        let tree = builder.finish();
        let add = tree.root().child(0).unwrap();
        assert_eq!(add.kind(), SyntaxKind::AddExpression);
        assert_eq!(add.child_count(), 3);
        assert_eq!(add.text(), "a+b");
    }
}
