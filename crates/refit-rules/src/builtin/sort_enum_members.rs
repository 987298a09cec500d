//! Sort the selected members of an enum by name or by value
//!
//! Members move with their leading trivia. The trivia after each member
//! stays in its slot, so separators and the line before the closing brace
//! keep their layout.

use super::sort_member_declarations::compare_names;
use crate::apply::RewriteResult;
use crate::context::MatchContext;
use crate::matchers::selection::SelectedNodes;
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, EnumDeclaration, EnumMemberDeclaration};
use refit_core::{Result, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "sort-enum-members";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Sort enum members",
        "Order the selected enum members by name or by value",
    )
    .with_category(RuleCategory::Style)
    .with_tags(&["enum", "sort"])
});

#[derive(Debug)]
pub struct SortEnumMatch {
    declaration: SyntaxNode,
    /// Selected members in source order
    selected: Vec<SyntaxNode>,
    /// Source positions in their sorted order
    order: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct SortEnumMembers;

/// Stable sorting permutation of `keys`, or `None` when already sorted
fn permutation<K>(keys: &[K], compare: impl Fn(&K, &K) -> std::cmp::Ordering) -> Option<Vec<usize>> {
    let sorted = keys
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != std::cmp::Ordering::Greater);
    if sorted {
        return None;
    }
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| compare(&keys[a], &keys[b]));
    Some(order)
}

#[async_trait]
impl Rule for SortEnumMembers {
    type Match = SortEnumMatch;

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
    ) -> Result<Vec<Candidate<SortEnumMatch>>> {
        let Some(declaration) = EnumDeclaration::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let Some(selection) = SelectedNodes::enum_members(&declaration, ctx.selection()) else {
            return Ok(Vec::new());
        };
        if !selection.are_many_selected() {
            return Ok(Vec::new());
        }
        let selected = selection.selected().to_vec();
        let mut candidates = Vec::new();

        let names: Vec<String> = selected
            .iter()
            .filter_map(|m| EnumMemberDeclaration::cast(m.clone()))
            .map(|m| m.name().unwrap_or_default())
            .collect();
        if let Some(order) = permutation(&names, |a, b| compare_names(a, b)) {
            candidates.push(Candidate::new(
                "Sort enum members by name",
                format!("{RULE_ID}:name"),
                SortEnumMatch {
                    declaration: node.clone(),
                    selected: selected.clone(),
                    order,
                },
            ));
        }

        let all_explicit = selected
            .iter()
            .filter_map(|m| EnumMemberDeclaration::cast(m.clone()))
            .all(|m| m.equals_value().and_then(|clause| clause.value()).is_some());
        if all_explicit {
            ctx.check_cancelled()?;
            let model = ctx.semantic_model().await?;
            let values: Option<Vec<i128>> = selected
                .iter()
                .map(|m| model.constant_value(m).and_then(|v| v.as_i128()))
                .collect();
            if let Some(order) = values.and_then(|values| permutation(&values, Ord::cmp)) {
                candidates.push(Candidate::new(
                    "Sort enum members by value",
                    format!("{RULE_ID}:value"),
                    SortEnumMatch {
                        declaration: node.clone(),
                        selected,
                        order,
                    },
                ));
            }
        }
        Ok(candidates)
    }

    fn build(&self, found: &SortEnumMatch, editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        let mut children = editor.children(found.declaration.id());
        for (slot, &source) in found.selected.iter().zip(&found.order) {
            let moved = editor.without_trailing_trivia(found.selected[source].id());
            let moved = editor.with_trailing_trivia(moved, slot.trailing_trivia());
            children[slot.index()] = moved;
        }
        let replacement = editor.node(SyntaxKind::EnumDeclaration, children);
        Ok(Some(RewriteResult::replace(&found.declaration, replacement)))
    }
}
