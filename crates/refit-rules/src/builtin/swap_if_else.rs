//! Swap the branches of an `if` / `else`
//!
//! `if (c) A else B` becomes `if (!c) B else A`, with the condition
//! negated by the negation builder. Each branch takes over the outer
//! trivia of the slot it moves into. Parentheses left around the whole
//! negated condition are dropped unless they hold a comment.

use crate::apply::RewriteResult;
use crate::builders::negation::{can_negate, logically_negate};
use crate::context::MatchContext;
use crate::matchers::if_chain::is_topmost_if;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, IfStatement};
use refit_core::syntax::trivia::is_whitespace_or_end_of_line;
use refit_core::{NodeId, Result, SelectionExt, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "swap-if-else-statements";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Swap statements in if-else",
        "Negate the condition of an if-else and swap its branches",
    )
    .with_tags(&["if", "statement"])
});

#[derive(Debug, Default)]
pub struct SwapIfElseStatements;

#[async_trait]
impl Rule for SwapIfElseStatements {
    type Match = IfStatement;

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
    ) -> Result<Vec<Candidate<IfStatement>>> {
        let Some(if_statement) = IfStatement::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        if !is_topmost_if(&if_statement) || !node.is_between_spans(ctx.selection()) {
            return Ok(Vec::new());
        }
        let when_false = if_statement
            .else_clause()
            .and_then(|else_clause| else_clause.statement());
        let swappable = when_false.is_some_and(|s| s.kind() != SyntaxKind::IfStatement)
            && if_statement.statement().is_some()
            && if_statement.condition().is_some_and(|c| can_negate(&c));
        if !swappable {
            return Ok(Vec::new());
        }
        Ok(vec![Candidate::new(
            "Swap statements in if-else",
            RULE_ID,
            if_statement,
        )])
    }

    fn build(&self, found: &IfStatement, editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        let (Some(condition), Some(when_true), Some(else_clause)) =
            (found.condition(), found.statement(), found.else_clause())
        else {
            return Ok(None);
        };
        let Some(when_false) = else_clause.statement() else {
            return Ok(None);
        };

        let negated = logically_negate(editor, condition.id())?;
        let negated = without_parentheses(editor, negated);
        let new_true = editor.with_trivia_from(when_false.id(), when_true.id());
        let new_false = editor.with_trivia_from(when_true.id(), when_false.id());
        let new_else = editor.with_child(else_clause.syntax().id(), when_false.index(), new_false);

        let node = found.syntax();
        let mut replacement = editor.with_child(node.id(), condition.index(), negated);
        replacement = editor.with_child(replacement, when_true.index(), new_true);
        replacement = editor.with_child(replacement, else_clause.syntax().index(), new_else);
        Ok(Some(RewriteResult::replace(node, replacement)))
    }
}

/// `(e)` as `e`, keeping the outer trivia
fn without_parentheses(editor: &mut TreeEditor, expression: NodeId) -> NodeId {
    if editor.kind(expression) != SyntaxKind::ParenthesizedExpression {
        return expression;
    }
    let [open, inner, close] = editor.children(expression)[..] else {
        return expression;
    };
    let inside = [
        editor.trailing_trivia(open),
        editor.leading_trivia(inner),
        editor.trailing_trivia(inner),
        editor.leading_trivia(close),
    ];
    if !inside.iter().all(|trivia| is_whitespace_or_end_of_line(trivia)) {
        return expression;
    }
    editor.with_trivia_from(inner, expression)
}
