//! Lossless, immutable syntax trees
//!
//! Trees are built once per document snapshot and never mutated. Every
//! character of the source, trivia included, is owned by exactly one token,
//! so `parse(text)?.text() == text` always holds.
//!
//! - [`arena`]: green elements addressed by [`NodeId`], layered for sharing
//! - [`tree`]: positioned [`SyntaxNode`] views and span lookups
//! - [`editor`]: path-copying edits producing new snapshots
//! - [`lexer`] / [`parser`]: text to tree for the fixture grammar
//! - [`ast`]: typed wrappers used by rules

pub mod arena;
pub mod ast;
pub mod builder;
pub mod editor;
pub mod kind;
pub mod lexer;
pub mod parser;
pub mod tree;
pub mod trivia;

pub use arena::{Arena, GreenElement, GreenNode, GreenToken, MAX_ARENA_DEPTH, NodeId};
pub use builder::{Checkpoint, TreeBuilder};
pub use editor::TreeEditor;
pub use kind::SyntaxKind;
pub use parser::parse;
pub use tree::{SnapshotId, SyntaxNode, SyntaxNodeChildren, SyntaxTree, TriviaAt};
pub use trivia::{Trivia, TriviaKind};
