//! Give every member of a `[Flags]` enum an explicit value
//!
//! Members without `= value` receive the next free flag value in order.
//! Generation stops at the first member for which no value fits the
//! underlying type; the members before it keep their new values.

use crate::apply::RewriteResult;
use crate::builders::factory;
use crate::context::MatchContext;
use crate::matchers::flags::{FlagValueMode, FlagsEnum};
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, EnumDeclaration, EnumMemberDeclaration};
use refit_core::{NodeId, Result, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "generate-enum-values";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Generate enum values",
        "Assign flag values to the members of a [Flags] enum that have none",
    )
    .with_category(RuleCategory::Style)
    .with_tags(&["enum", "flags"])
});

#[derive(Debug)]
pub struct GenerateValuesMatch {
    declaration: SyntaxNode,
    /// Members without a value, with the value each one gets
    assignments: Vec<(EnumMemberDeclaration, i128)>,
}

#[derive(Debug, Default)]
pub struct GenerateEnumValues;

/// Values for the members of `declaration` lacking one, in member order
pub fn assign_values(
    declaration: &EnumDeclaration,
    flags: &FlagsEnum,
    mode: FlagValueMode,
) -> Vec<(EnumMemberDeclaration, i128)> {
    let mut flags = flags.clone();
    let mut assignments = Vec::new();
    for member in declaration.members().filter(|m| m.equals_value().is_none()) {
        let Some(value) = flags.next_value(mode) else {
            tracing::debug!(
                member = member.name().unwrap_or_default(),
                "No flag value left for member"
            );
            break;
        };
        flags.values.push(value);
        assignments.push((member, value));
    }
    assignments
}

/// `member = value`, keeping the member's trailing trivia at the end
pub fn with_value(editor: &mut TreeEditor, member: &EnumMemberDeclaration, value: i128) -> Option<NodeId> {
    let identifier = member.identifier()?;
    let trailing = identifier.trailing_trivia();
    let bare = editor.without_trailing_trivia(identifier.id());
    let literal = factory::numeric_literal(editor, value);
    let clause = factory::equals_value_clause(editor, literal);
    let clause = editor.with_trailing_trivia(clause, trailing);
    let mut children = editor.children(member.syntax().id());
    children.splice(identifier.index()..identifier.index() + 1, [bare, clause]);
    Some(editor.node(SyntaxKind::EnumMemberDeclaration, children))
}

#[async_trait]
impl Rule for GenerateEnumValues {
    type Match = GenerateValuesMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::EnumDeclaration]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<GenerateValuesMatch>>> {
        let Some(declaration) = EnumDeclaration::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let (missing, explicit): (Vec<_>, Vec<_>) = declaration
            .members()
            .partition(|member| member.equals_value().is_none());
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let model = ctx.semantic_model().await?;
        let Some(flags) = FlagsEnum::of(&declaration, model.as_ref()) else {
            return Ok(Vec::new());
        };

        let mut modes = vec![(FlagValueMode::UseAllAvailable, "Generate enum values")];
        if !explicit.is_empty() {
            modes.push((
                FlagValueMode::StartFromHighest,
                "Generate enum values (starting from highest explicit value)",
            ));
        }
        let mut offered: Vec<Vec<i128>> = Vec::new();
        let mut candidates = Vec::new();
        for (mode, title) in modes {
            let assignments = assign_values(&declaration, &flags, mode);
            let values: Vec<i128> = assignments.iter().map(|(_, value)| *value).collect();
            if assignments.is_empty() || offered.contains(&values) {
                continue;
            }
            offered.push(values);
            candidates.push(Candidate::new(
                title,
                format!("{RULE_ID}:{mode:?}"),
                GenerateValuesMatch {
                    declaration: node.clone(),
                    assignments,
                },
            ));
        }
        Ok(candidates)
    }

    fn build(
        &self,
        found: &GenerateValuesMatch,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let mut children = editor.children(found.declaration.id());
        for (member, value) in &found.assignments {
            let Some(replacement) = with_value(editor, member, *value) else {
                return Ok(None);
            };
            children[member.syntax().index()] = replacement;
        }
        let replacement = editor.node(SyntaxKind::EnumDeclaration, children);
        Ok(Some(RewriteResult::replace(&found.declaration, replacement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache, SyntaxTree};
    use std::sync::Arc;

    async fn offers(tree: &SyntaxTree) -> Vec<Candidate<GenerateValuesMatch>> {
        let ctx = MatchContext::new(
            tree.clone(),
            tree.full_span(),
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        );
        let declaration = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::EnumDeclaration)
            .unwrap();
        GenerateEnumValues.matches(&declaration, &ctx).await.unwrap()
    }

    fn generate(tree: &SyntaxTree, found: &GenerateValuesMatch) -> String {
        let mut editor = TreeEditor::new(tree);
        let rewrite = GenerateEnumValues.build(found, &mut editor).unwrap().unwrap();
        apply(editor, rewrite).unwrap().text().to_string()
    }

    #[tokio::test]
    async fn test_values_start_at_zero() {
        let tree = parse("[Flags]\nenum Flags\n{\n    A,\n    B,\n    C\n}\n").unwrap();
        let found = offers(&tree).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Generate enum values");
        assert_eq!(
            generate(&tree, &found[0].payload),
            "[Flags]\nenum Flags\n{\n    A = 0,\n    B = 1,\n    C = 2\n}\n"
        );
    }

    #[tokio::test]
    async fn test_both_modes_with_explicit_values() {
        let tree = parse("[Flags] enum E { None = 0, Read = 1, Big = 8, Write, Run }").unwrap();
        let found = offers(&tree).await;
        let outputs: Vec<_> = found.iter().map(|c| generate(&tree, &c.payload)).collect();
        assert_eq!(
            outputs,
            vec![
                "[Flags] enum E { None = 0, Read = 1, Big = 8, Write = 2, Run = 4 }",
                "[Flags] enum E { None = 0, Read = 1, Big = 8, Write = 16, Run = 32 }",
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_as_highest_offers_one_rewrite() {
        let tree = parse("[Flags] enum E { None = 0, A, B }").unwrap();
        let found = offers(&tree).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Generate enum values");
        assert_eq!(
            generate(&tree, &found[0].payload),
            "[Flags] enum E { None = 0, A = 1, B = 2 }"
        );
    }

    #[tokio::test]
    async fn test_identical_offers_are_merged() {
        let tree = parse("[Flags] enum E { A = 1, B = 2, C }").unwrap();
        let found = offers(&tree).await;
        assert_eq!(found.len(), 1);
        assert_eq!(
            generate(&tree, &found[0].payload),
            "[Flags] enum E { A = 1, B = 2, C = 4 }"
        );
    }

    #[tokio::test]
    async fn test_generation_stops_on_overflow() {
        let tree = parse("[Flags] enum E : sbyte { A = 32, B, C }").unwrap();
        let found = offers(&tree).await;
        let highest = found
            .iter()
            .find(|c| c.title.contains("highest"))
            .unwrap();
        assert_eq!(
            generate(&tree, &highest.payload),
            "[Flags] enum E : sbyte { A = 32, B = 64, C }"
        );
    }

    #[tokio::test]
    async fn test_requires_flags_attribute() {
        let tree = parse("enum E { A, B }").unwrap();
        assert!(offers(&tree).await.is_empty());
        let tree = parse("[Flags] enum E { A = 1, B = 2 }").unwrap();
        assert!(offers(&tree).await.is_empty());
    }
}
