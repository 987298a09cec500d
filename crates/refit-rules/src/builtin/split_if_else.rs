//! Split an `if` / `else if` chain into consecutive statements
//!
//! ```text
//! if (x) A(); else if (y) B(); else C();
//! ```
//!
//! becomes
//!
//! ```text
//! if (x) A();
//! if (y) B();
//! C();
//! ```
//!
//! Every new statement starts on its own line, indented like the topmost
//! `if`. The statements of a final `else` block are unwrapped. Comments
//! attached to the dropped `else` keywords and braces move to the line of
//! the statement that follows them.

use crate::apply::RewriteResult;
use crate::builders::trivia::{
    blank_suffix, comment_lines, comments_of, indent_trivia, inline_comments, reindent, trim_end,
};
use crate::context::MatchContext;
use crate::matchers::if_chain::{ChainLink, chain, contains_else_if, is_topmost_if};
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, Block, IfStatement};
use refit_core::{NodeId, Result, SelectionExt, SyntaxKind, SyntaxNode, Trivia, TreeEditor};

pub const RULE_ID: &str = "split-if-else";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Split if-else",
        "Split an if-else-if chain into consecutive statements",
    )
    .with_tags(&["if", "statement"])
});

#[derive(Debug, Default)]
pub struct SplitIfElse;

#[derive(Debug)]
pub struct SplitIfElseMatch {
    if_statement: IfStatement,
    newline: String,
}

#[async_trait]
impl Rule for SplitIfElse {
    type Match = SplitIfElseMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::IfStatement]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<SplitIfElseMatch>>> {
        let Some(if_statement) = IfStatement::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        if !is_topmost_if(&if_statement)
            || !node.is_between_spans(ctx.selection())
            || !contains_else_if(&if_statement)
        {
            return Ok(Vec::new());
        }
        // the pieces need a statement list to land in
        let in_list = node
            .parent()
            .is_some_and(|p| matches!(p.kind(), SyntaxKind::Block | SyntaxKind::SwitchSection));
        if !in_list {
            return Ok(Vec::new());
        }
        Ok(vec![Candidate::new(
            "Split if-else",
            RULE_ID,
            SplitIfElseMatch {
                if_statement,
                newline: ctx.newline().to_string(),
            },
        )])
    }

    fn build(
        &self,
        found: &SplitIfElseMatch,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let topmost = found.if_statement.syntax();
        let mut lines = Lines {
            indent: indent_trivia(topmost),
            newline: &found.newline,
            pieces: Vec::new(),
            pending: Vec::new(),
        };

        for link in chain(&found.if_statement) {
            match link {
                ChainLink::If(current) => {
                    let mut id = current.syntax().id();
                    if let Some(else_clause) = current.else_clause() {
                        let index = else_clause.syntax().index();
                        id = editor.splice_children(id, index..index + 1, Vec::new());
                        if let Some(keyword) = else_clause.else_keyword() {
                            lines.pending.extend(comments_of(&keyword));
                        }
                    }
                    lines.push(editor, id);
                }
                ChainLink::Else(else_clause) => {
                    let Some(statement) = else_clause.statement() else {
                        continue;
                    };
                    let Some(block) = Block::cast(statement.clone()) else {
                        lines.push(editor, statement.id());
                        continue;
                    };
                    if let Some(open) = block.open_brace() {
                        lines.pending.extend(comments_of(&open));
                    }
                    for inner in block.statements() {
                        lines.push(editor, inner.id());
                    }
                    if let Some(close) = block.close_brace() {
                        lines.pending.extend(comments_of(&close));
                    }
                }
            }
        }

        let Some(last) = lines.pieces.pop() else {
            return Ok(None);
        };
        let mut trailing = editor.trailing_trivia(last);
        trailing.extend(inline_comments(&lines.pending));
        trailing.extend(blank_suffix(&topmost.trailing_trivia()));
        let last = editor.with_trailing_trivia(last, trailing);
        lines.pieces.push(last);

        Ok(Some(RewriteResult::replace_range(
            vec![topmost.clone()],
            lines.pieces,
        )))
    }
}

/// Accumulates the split statements
struct Lines<'a> {
    indent: Vec<Trivia>,
    newline: &'a str,
    pieces: Vec<NodeId>,
    /// Comments of dropped tokens, waiting for the next statement
    pending: Vec<Trivia>,
}

impl Lines<'_> {
    fn push(&mut self, editor: &mut TreeEditor, id: NodeId) {
        let trailing = trim_end(&editor.trailing_trivia(id));
        let id = editor.with_trailing_trivia(id, trailing);
        if self.pieces.is_empty() {
            self.pieces.push(id);
            return;
        }
        let mut leading = vec![Trivia::end_of_line(self.newline)];
        leading.extend(comment_lines(
            &std::mem::take(&mut self.pending),
            &self.indent,
            self.newline,
        ));
        leading.extend(reindent(&editor.leading_trivia(id), &self.indent));
        let id = editor.with_leading_trivia(id, leading);
        self.pieces.push(id);
    }
}
