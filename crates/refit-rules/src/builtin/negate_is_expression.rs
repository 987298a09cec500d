//! Negate a type test
//!
//! `x is T` becomes `!(x is T)`, and `!(x is T)` becomes `(x is T)`.
//! Parentheses already around the test are reused.

use crate::apply::RewriteResult;
use crate::builders::factory;
use crate::builders::negation::logically_negate;
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::{Result, SelectionExt, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "negate-is-expression";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(RULE_ID, "Negate is", "Negate an `is` type test")
        .with_tags(&["operator", "expression"])
});

#[derive(Debug, Default)]
pub struct NegateIsExpression;

/// The expression to negate
#[derive(Debug)]
pub enum NegateIsTarget {
    /// A bare `x is T`, or `!(x is T)`
    Expression(SyntaxNode),
    /// `(x is T)` not under a `!`
    Parenthesized(SyntaxNode),
}

#[async_trait]
impl Rule for NegateIsExpression {
    type Match = NegateIsTarget;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::IsExpression]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<NegateIsTarget>>> {
        if node.kind() != SyntaxKind::IsExpression
            || !node.is_empty_and_contained_or_between(ctx.selection())
        {
            return Ok(Vec::new());
        }
        let target = match node.parent() {
            Some(parent) if parent.kind() == SyntaxKind::ParenthesizedExpression => {
                match parent.parent() {
                    Some(not) if not.kind() == SyntaxKind::LogicalNotExpression => {
                        NegateIsTarget::Expression(not)
                    }
                    _ => NegateIsTarget::Parenthesized(parent),
                }
            }
            _ => NegateIsTarget::Expression(node.clone()),
        };
        Ok(vec![Candidate::new("Negate is", RULE_ID, target)])
    }

    fn build(
        &self,
        found: &NegateIsTarget,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let (original, replacement) = match found {
            NegateIsTarget::Expression(node) => (node, logically_negate(editor, node.id())?),
            NegateIsTarget::Parenthesized(node) => {
                let operand = editor.without_trivia(node.id());
                let not = factory::prefix_unary(editor, SyntaxKind::LogicalNotExpression, operand)?;
                (node, editor.with_trivia_from(not, node.id()))
            }
        };
        Ok(Some(RewriteResult::replace(original, replacement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache, TextRange, TextSize};
    use std::sync::Arc;

    async fn negate(condition: &str) -> String {
        let text = format!("class C {{ void M() {{ if ({condition}) x(); }} }}");
        let tree = parse(&text).unwrap();
        let node = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::IsExpression)
            .unwrap();
        let caret = TextRange::empty(TextSize::from(text.find(" is ").unwrap() as u32));
        let ctx = MatchContext::new(
            tree.clone(),
            caret,
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        );
        let candidates = NegateIsExpression.matches(&node, &ctx).await.unwrap();
        assert_eq!(candidates.len(), 1);
        let mut editor = TreeEditor::new(&tree);
        let rewrite = NegateIsExpression
            .build(&candidates[0].payload, &mut editor)
            .unwrap()
            .unwrap();
        let output = apply(editor, rewrite).unwrap().text().to_string();
        let start = output.find("if (").unwrap() + 4;
        let end = output.rfind(") x()").unwrap();
        output[start..end].to_string()
    }

    #[tokio::test]
    async fn test_bare_test_gets_parenthesized() {
        assert_eq!(negate("o is string").await, "!(o is string)");
    }

    #[tokio::test]
    async fn test_negated_test_is_unwrapped() {
        assert_eq!(negate("!(o is string)").await, "(o is string)");
    }

    #[tokio::test]
    async fn test_existing_parentheses_are_reused() {
        assert_eq!(negate("(o is string) && b").await, "!(o is string) && b");
    }
}
