//! Merge a local declaration into the `return` that follows it
//!
//! ```text
//! string s = Foo();
//! return s;
//! ```
//!
//! becomes `return Foo();`. The returned name must bind to the declared
//! local, the declaration must declare exactly that one initialized
//! variable, and only whitespace may sit between the two statements.

use crate::apply::RewriteResult;
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::span::all_whitespace_or_end_of_line;
use refit_core::syntax::ast::{AstNode, LocalDeclarationStatement, ReturnStatement};
use refit_core::{Diagnostic, Result, Severity, SyntaxKind, SyntaxNode, TextRange, TreeEditor};

pub const RULE_ID: &str = "merge-local-declaration-with-return";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::analyzer(
        RULE_ID,
        "Merge local declaration with return statement",
        "A local that is only declared to be returned right away can be inlined into the return",
        Severity::Info,
    )
    .with_category(RuleCategory::Simplification)
    .with_tags(&["local", "return"])
});

#[derive(Debug, Default)]
pub struct MergeLocalDeclarationWithReturn;

#[derive(Debug)]
pub struct MergeMatch {
    local: LocalDeclarationStatement,
    value: SyntaxNode,
    return_statement: ReturnStatement,
    /// Parts of the declaration that disappear
    fade_out: Vec<TextRange>,
}

#[async_trait]
impl Rule for MergeLocalDeclarationWithReturn {
    type Match = MergeMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::ReturnStatement]
    }

    async fn matches(&self, node: &SyntaxNode, ctx: &MatchContext) -> Result<Vec<Candidate<MergeMatch>>> {
        let Some(return_statement) = ReturnStatement::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let Some(expression) = return_statement
            .expression()
            .filter(|e| e.kind() == SyntaxKind::IdentifierName)
        else {
            return Ok(Vec::new());
        };
        let Some(block) = node.parent().filter(|p| p.kind() == SyntaxKind::Block) else {
            return Ok(Vec::new());
        };
        let Some(local) = node.prev_sibling().and_then(LocalDeclarationStatement::cast) else {
            return Ok(Vec::new());
        };
        let Some(declaration) = local.declaration() else {
            return Ok(Vec::new());
        };
        let declarators: Vec<_> = declaration.declarators().collect();
        let [declarator] = declarators.as_slice() else {
            return Ok(Vec::new());
        };
        let Some(initializer) = declarator.initializer() else {
            return Ok(Vec::new());
        };
        let Some(value) = initializer.value() else {
            return Ok(Vec::new());
        };

        let range = TextRange::new(local.syntax().span().start(), node.span().end());
        if !all_whitespace_or_end_of_line(&block, range) {
            return Ok(Vec::new());
        }

        let model = ctx.semantic_model().await?;
        let Some(symbol) = model.symbol_of(&expression).filter(|s| s.is_local()) else {
            return Ok(Vec::new());
        };
        let Some(declared) = model.declared_symbol(declarator.syntax()) else {
            return Ok(Vec::new());
        };
        if symbol.id != declared.id {
            return Ok(Vec::new());
        }

        let fade_out = [
            declaration.ty().map(|ty| ty.span()),
            declarator.identifier().map(|id| id.span()),
            initializer.equals_token().map(|eq| eq.span()),
            local.semicolon().map(|semicolon| semicolon.span()),
            Some(expression.span()),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(vec![Candidate::new(
            "Merge local declaration with return statement",
            RULE_ID,
            MergeMatch {
                local,
                value,
                return_statement,
                fade_out,
            },
        )])
    }

    fn build(&self, found: &MergeMatch, editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        let Some(expression) = found.return_statement.expression() else {
            return Ok(None);
        };
        let value = editor.without_trivia(found.value.id());
        let statement = found.return_statement.syntax();
        let merged = editor.with_child(statement.id(), expression.index(), value);
        let merged = editor.with_leading_trivia(merged, found.local.syntax().leading_trivia());
        Ok(Some(RewriteResult::replace_range(
            vec![found.local.syntax().clone(), statement.clone()],
            vec![merged],
        )))
    }

    fn diagnostic(&self, _node: &SyntaxNode, found: &MergeMatch) -> Option<Diagnostic> {
        let range = TextRange::new(
            found.local.syntax().span().start(),
            found.return_statement.syntax().span().end(),
        );
        Some(
            Diagnostic::new(RULE_ID, range, "Local declaration can be merged with return statement")
                .with_severity(METADATA.severity)
                .with_fade_out(found.fade_out.iter().copied()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache, SyntaxTree};
    use std::sync::Arc;

    fn context(tree: &SyntaxTree) -> MatchContext {
        MatchContext::new(
            tree.clone(),
            tree.full_span(),
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        )
    }

    async fn matches(text: &str) -> (SyntaxTree, Vec<Candidate<MergeMatch>>) {
        let tree = parse(text).unwrap();
        let node = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ReturnStatement)
            .unwrap();
        let candidates = MergeLocalDeclarationWithReturn
            .matches(&node, &context(&tree))
            .await
            .unwrap();
        (tree, candidates)
    }

    #[tokio::test]
    async fn test_merges_into_return() {
        let text = "class C\n{\n    string M()\n    {\n        string s = Foo();\n        return s;\n    }\n}\n";
        let (tree, candidates) = matches(text).await;
        assert_eq!(candidates.len(), 1);
        let mut editor = TreeEditor::new(&tree);
        let rewrite = MergeLocalDeclarationWithReturn
            .build(&candidates[0].payload, &mut editor)
            .unwrap()
            .unwrap();
        assert_eq!(
            apply(editor, rewrite).unwrap().text(),
            "class C\n{\n    string M()\n    {\n        return Foo();\n    }\n}\n"
        );
    }

    #[tokio::test]
    async fn test_fade_out_covers_removed_parts() {
        let text = "class C { int M() { int n = 1 + 2; return n; } }";
        let (tree, candidates) = matches(text).await;
        let node = tree.root();
        let diagnostic = MergeLocalDeclarationWithReturn
            .diagnostic(&node, &candidates[0].payload)
            .unwrap();
        let faded: Vec<_> = diagnostic
            .fade_out
            .iter()
            .map(|range| &text[usize::from(range.start())..usize::from(range.end())])
            .collect();
        assert_eq!(faded, vec!["int", "n", "=", ";", "n"]);
        assert_eq!(
            &text[usize::from(diagnostic.range.start())..usize::from(diagnostic.range.end())],
            "int n = 1 + 2; return n;"
        );
    }

    #[tokio::test]
    async fn test_preconditions() {
        // comment between the statements
        let (_, found) = matches("class C { int M() { int n = 1; /* keep */ return n; } }").await;
        assert!(found.is_empty());
        // returns something else
        let (_, found) = matches("class C { int M() { int n = 1; return m; } }").await;
        assert!(found.is_empty());
        // two declarators
        let (_, found) = matches("class C { int M() { int n = 1, m = 2; return n; } }").await;
        assert!(found.is_empty());
        // not adjacent
        let (_, found) = matches("class C { int M() { int n = 1; x(); return n; } }").await;
        assert!(found.is_empty());
        // a field, not a local
        let (_, found) = matches("class C { int n; int M() { C n2 = null; return n; } }").await;
        assert!(found.is_empty());
    }
}
