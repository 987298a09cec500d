//! Sort the selected member declarations of a namespace or type
//!
//! When the selection covers members of a single kind the rule offers a
//! sort by name. Mixed selections get "by kind" and "by kind then by
//! name". Each offer only appears while the selection is out of order in
//! its own sense, so applying one and matching again offers nothing.

use crate::apply::RewriteResult;
use crate::context::MatchContext;
use crate::matchers::selection::SelectedNodes;
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, MemberContainer, VariableDeclaration};
use refit_core::{Result, SyntaxKind, SyntaxNode, TreeEditor};
use std::cmp::Ordering;

pub const RULE_ID: &str = "sort-member-declarations";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Sort member declarations",
        "Order the selected members by kind, by name, or both",
    )
    .with_category(RuleCategory::Style)
    .with_tags(&["member", "sort"])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSortMode {
    ByKind,
    ByKindThenByName,
}

#[derive(Debug)]
pub struct SortMembersMatch {
    selected: Vec<SyntaxNode>,
    mode: MemberSortMode,
}

#[derive(Debug, Default)]
pub struct SortMemberDeclarations;

/// Position of a member kind in the sorted order
pub fn kind_rank(member: &SyntaxNode) -> u8 {
    match member.kind() {
        SyntaxKind::FieldDeclaration if is_const(member) => 0,
        SyntaxKind::FieldDeclaration => 1,
        SyntaxKind::ConstructorDeclaration => 2,
        SyntaxKind::PropertyDeclaration => 3,
        SyntaxKind::MethodDeclaration => 4,
        SyntaxKind::EnumDeclaration => 5,
        SyntaxKind::InterfaceDeclaration => 6,
        SyntaxKind::StructDeclaration => 7,
        SyntaxKind::ClassDeclaration => 8,
        SyntaxKind::NamespaceDeclaration => 9,
        _ => u8::MAX,
    }
}

fn is_const(member: &SyntaxNode) -> bool {
    member.child_tokens().any(|t| t.kind() == SyntaxKind::ConstKw)
}

/// Whether members of this kind have a name worth sorting by
pub fn can_sort_by_name(kind: SyntaxKind) -> bool {
    kind.is_member_declaration() && kind != SyntaxKind::ConstructorDeclaration
}

/// Name a member is sorted by
///
/// Fields go by their first declarator, namespaces by their full name.
pub fn member_name(member: &SyntaxNode) -> Option<String> {
    match member.kind() {
        SyntaxKind::ConstructorDeclaration => None,
        SyntaxKind::FieldDeclaration => member
            .child_nodes()
            .find_map(VariableDeclaration::cast)?
            .declarators()
            .next()?
            .name(),
        SyntaxKind::NamespaceDeclaration => member
            .child_nodes()
            .find(|n| matches!(n.kind(), SyntaxKind::IdentifierName | SyntaxKind::QualifiedName))
            .map(|n| n.trimmed_text()),
        _ => member
            .child_tokens()
            .find(|t| t.kind() == SyntaxKind::Identifier)
            .map(|t| t.token_text().to_string()),
    }
}

/// Case-insensitive order with an ordinal tie-break
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &SyntaxNode, b: &SyntaxNode, mode: MemberSortMode) -> Ordering {
    let by_kind = kind_rank(a).cmp(&kind_rank(b));
    match mode {
        MemberSortMode::ByKind => by_kind,
        MemberSortMode::ByKindThenByName => by_kind.then_with(|| {
            match (member_name(a), member_name(b)) {
                (Some(a), Some(b)) => compare_names(&a, &b),
                _ => Ordering::Equal,
            }
        }),
    }
}

pub fn is_sorted(members: &[SyntaxNode], mode: MemberSortMode) -> bool {
    members
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1], mode) != Ordering::Greater)
}

#[async_trait]
impl Rule for SortMemberDeclarations {
    type Match = SortMembersMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[
            SyntaxKind::NamespaceDeclaration,
            SyntaxKind::ClassDeclaration,
            SyntaxKind::StructDeclaration,
            SyntaxKind::InterfaceDeclaration,
        ]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<SortMembersMatch>>> {
        let Some(container) = MemberContainer::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let Some(selection) = SelectedNodes::members(&container, ctx.selection()) else {
            return Ok(Vec::new());
        };
        if !selection.are_many_selected() {
            return Ok(Vec::new());
        }
        let selected = selection.selected().to_vec();
        let single_kind = selected
            .iter()
            .all(|m| m.kind() == selected[0].kind())
            .then(|| selected[0].kind());

        let offers: &[(MemberSortMode, &str)] = match single_kind {
            Some(kind) if can_sort_by_name(kind) => {
                &[(MemberSortMode::ByKindThenByName, "Sort members by name")]
            }
            Some(_) => &[],
            None => &[
                (MemberSortMode::ByKind, "Sort members by kind"),
                (
                    MemberSortMode::ByKindThenByName,
                    "Sort members by kind then by name",
                ),
            ],
        };
        Ok(offers
            .iter()
            .filter(|(mode, _)| !is_sorted(&selected, *mode))
            .map(|(mode, title)| {
                Candidate::new(
                    *title,
                    format!("{RULE_ID}:{title}"),
                    SortMembersMatch {
                        selected: selected.clone(),
                        mode: *mode,
                    },
                )
            })
            .collect())
    }

    fn build(
        &self,
        found: &SortMembersMatch,
        _editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let mut sorted = found.selected.clone();
        sorted.sort_by(|a, b| compare(a, b, found.mode));
        Ok(Some(RewriteResult::replace_range(
            found.selected.clone(),
            sorted.iter().map(|m| m.id()).collect(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache, SyntaxTree};
    use std::sync::Arc;

    async fn offers(tree: &SyntaxTree) -> Vec<Candidate<SortMembersMatch>> {
        let ctx = MatchContext::new(
            tree.clone(),
            tree.full_span(),
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        );
        let class = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ClassDeclaration)
            .unwrap();
        SortMemberDeclarations.matches(&class, &ctx).await.unwrap()
    }

    fn sort(tree: &SyntaxTree, found: &SortMembersMatch) -> SyntaxTree {
        let mut editor = TreeEditor::new(tree);
        let rewrite = SortMemberDeclarations.build(found, &mut editor).unwrap().unwrap();
        apply(editor, rewrite).unwrap()
    }

    #[test]
    fn test_names_compare_case_insensitively() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("B", "b"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[tokio::test]
    async fn test_single_kind_sorts_by_name() {
        let tree = parse("class C {\n    void b() { }\n    void A() { }\n}\n").unwrap();
        let found = offers(&tree).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Sort members by name");
        let sorted = sort(&tree, &found[0].payload);
        assert_eq!(sorted.text(), "class C {\n    void A() { }\n    void b() { }\n}\n");
        assert!(offers(&sorted).await.is_empty());
    }

    #[tokio::test]
    async fn test_mixed_kinds() {
        let text = "class C { void M() { } int b; const int Z = 1; int a; C() { } }";
        let tree = parse(text).unwrap();
        let found = offers(&tree).await;
        let titles: Vec<_> = found.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Sort members by kind", "Sort members by kind then by name"]);

        let by_kind = sort(&tree, &found[0].payload);
        assert_eq!(
            by_kind.text(),
            "class C { const int Z = 1; int b; int a; C() { } void M() { } }"
        );
        let by_name = sort(&tree, &found[1].payload);
        assert_eq!(
            by_name.text(),
            "class C { const int Z = 1; int a; int b; C() { } void M() { } }"
        );
        assert!(offers(&by_name).await.is_empty());

        let again: Vec<_> = offers(&by_kind).await.into_iter().map(|c| c.title).collect();
        assert_eq!(again, vec!["Sort members by kind then by name"]);
    }

    #[tokio::test]
    async fn test_constructors_are_not_sorted_by_name() {
        let tree = parse("class C { C(int a) { } C() { } }").unwrap();
        assert!(offers(&tree).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_member_is_not_offered() {
        let tree = parse("class C { int b; }").unwrap();
        assert!(offers(&tree).await.is_empty());
    }
}
