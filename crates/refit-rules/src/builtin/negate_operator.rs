//! Replace a binary operator with its negation
//!
//! The caret (or selection) must lie on the operator token. Comparison
//! operators flip to their complement and `&&`, `||`, `&`, `|` swap with
//! their dual. Operands are left alone.

use crate::apply::RewriteResult;
use crate::builders::negation::{negated_binary_kind, negated_operator};
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, BinaryExpression};
use refit_core::{Result, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "negate-operator";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Negate operator",
        "Replace a comparison or logical operator with its negation",
    )
    .with_tags(&["operator", "expression"])
});

const KINDS: &[SyntaxKind] = &[
    SyntaxKind::LessThanExpression,
    SyntaxKind::LessThanOrEqualExpression,
    SyntaxKind::GreaterThanExpression,
    SyntaxKind::GreaterThanOrEqualExpression,
    SyntaxKind::EqualsExpression,
    SyntaxKind::NotEqualsExpression,
    SyntaxKind::LogicalAndExpression,
    SyntaxKind::LogicalOrExpression,
    SyntaxKind::BitwiseAndExpression,
    SyntaxKind::BitwiseOrExpression,
];

#[derive(Debug, Default)]
pub struct NegateOperator;

#[async_trait]
impl Rule for NegateOperator {
    type Match = BinaryExpression;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        KINDS
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<BinaryExpression>>> {
        let Some(binary) = BinaryExpression::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let Some(operator) = binary.operator() else {
            return Ok(Vec::new());
        };
        if !operator.span().contains_range(ctx.selection())
            || negated_operator(operator.kind()).is_none()
        {
            return Ok(Vec::new());
        }
        Ok(vec![Candidate::new("Negate operator", RULE_ID, binary)])
    }

    fn build(
        &self,
        found: &BinaryExpression,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let node = found.syntax();
        let (Some(kind), Some(operator)) = (negated_binary_kind(node.kind()), found.operator())
        else {
            return Ok(None);
        };
        let Some(flipped) = negated_operator(operator.kind()) else {
            return Ok(None);
        };
        let token = editor.token_with_trivia(
            flipped,
            flipped.fixed_text().unwrap_or_default(),
            operator.leading_trivia(),
            operator.trailing_trivia(),
        );
        let mut children = editor.children(node.id());
        children[operator.index()] = token;
        let replacement = editor.node(kind, children);
        Ok(Some(RewriteResult::replace(node, replacement)))
    }
}
