//! Append a new member to a `[Flags]` enum
//!
//! The member is named `EnumMember` (numbered when taken) and gets the
//! next free flag value. The second offer, starting from the highest
//! explicit value, is dropped when it would produce the same value.

use crate::apply::RewriteResult;
use crate::builders::factory;
use crate::builders::trivia::{blank_suffix, contains_end_of_line, indent_trivia};
use crate::context::MatchContext;
use crate::matchers::flags::{FlagValueMode, FlagsEnum};
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, EnumDeclaration};
use refit_core::{Result, SyntaxKind, SyntaxNode, TextRange, Trivia, TreeEditor};

pub const RULE_ID: &str = "generate-enum-member";

const BASE_NAME: &str = "EnumMember";

/// Indentation added for members of an empty multi-line enum
const INDENT_UNIT: &str = "    ";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Generate enum member",
        "Append a member with the next free flag value to a [Flags] enum",
    )
    .with_category(RuleCategory::Style)
    .with_tags(&["enum", "flags"])
});

#[derive(Debug)]
pub struct GenerateMemberMatch {
    declaration: EnumDeclaration,
    name: String,
    value: i128,
    newline: String,
}

#[derive(Debug, Default)]
pub struct GenerateEnumMember;

/// `EnumMember`, or `EnumMember2`, `EnumMember3`... when taken
pub fn unique_member_name<'a>(existing: impl IntoIterator<Item = &'a str> + Clone) -> String {
    let taken = |name: &str| existing.clone().into_iter().any(|e| e == name);
    if !taken(BASE_NAME) {
        return BASE_NAME.to_string();
    }
    (2..)
        .map(|n| format!("{BASE_NAME}{n}"))
        .find(|name| !taken(name))
        .unwrap_or_else(|| BASE_NAME.to_string())
}

#[async_trait]
impl Rule for GenerateEnumMember {
    type Match = GenerateMemberMatch;

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
    ) -> Result<Vec<Candidate<GenerateMemberMatch>>> {
        let Some(declaration) = EnumDeclaration::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let (Some(open), Some(close)) = (declaration.open_brace(), declaration.close_brace()) else {
            return Ok(Vec::new());
        };
        let braces = TextRange::new(open.span().start(), close.span().end());
        if !braces.contains_range(ctx.selection()) {
            return Ok(Vec::new());
        }

        let model = ctx.semantic_model().await?;
        let Some(flags) = FlagsEnum::of(&declaration, model.as_ref()) else {
            return Ok(Vec::new());
        };
        let names: Vec<String> = declaration.members().filter_map(|m| m.name()).collect();
        let name = unique_member_name(names.iter().map(String::as_str));

        let first = flags.next_value(FlagValueMode::UseAllAvailable);
        let second = flags
            .next_value(FlagValueMode::StartFromHighest)
            .filter(|value| Some(*value) != first);
        let offers = [
            (first, "Generate enum member"),
            (
                second,
                "Generate enum member (starting from highest explicit value)",
            ),
        ];
        Ok(offers
            .into_iter()
            .filter_map(|(value, title)| {
                let value = value?;
                Some(Candidate::new(
                    title,
                    format!("{RULE_ID}:{title}"),
                    GenerateMemberMatch {
                        declaration: declaration.clone(),
                        name: name.clone(),
                        value,
                        newline: ctx.newline().to_string(),
                    },
                ))
            })
            .collect())
    }

    fn build(
        &self,
        found: &GenerateMemberMatch,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let node = found.declaration.syntax();
        let Some(open) = found.declaration.open_brace() else {
            return Ok(None);
        };
        let literal = factory::numeric_literal(editor, found.value);
        let member = factory::enum_member(editor, &found.name, Some(literal));

        let last_member = found.declaration.members().last();
        let trailing_comma = last_member
            .as_ref()
            .and_then(|m| m.syntax().next_sibling())
            .filter(|t| t.kind() == SyntaxKind::Comma);

        let mut children = editor.children(node.id());
        match (last_member, trailing_comma) {
            (None, _) => {
                let after_brace = open.trailing_trivia();
                let (leading, trailing) = if contains_end_of_line(&after_brace) {
                    let mut indent = indent_trivia(node);
                    indent.push(Trivia::whitespace(INDENT_UNIT));
                    (indent, vec![Trivia::end_of_line(found.newline.as_str())])
                } else {
                    (Vec::new(), after_brace)
                };
                let member = editor.with_leading_trivia(member, leading);
                let member = editor.with_trailing_trivia(member, trailing);
                children.insert(open.index() + 1, member);
            }
            (Some(last), Some(comma)) => {
                let after_comma = comma.trailing_trivia();
                let leading = if contains_end_of_line(&after_comma) {
                    indent_trivia(last.syntax())
                } else {
                    Vec::new()
                };
                let member = editor.with_leading_trivia(member, leading);
                let member = editor.with_trailing_trivia(member, blank_suffix(&after_comma));
                children.insert(comma.index() + 1, member);
            }
            (Some(last), None) => {
                let last = last.syntax();
                let trailing = last.trailing_trivia();
                let leading = if contains_end_of_line(&trailing) {
                    indent_trivia(last)
                } else {
                    Vec::new()
                };
                let bare = editor.without_trailing_trivia(last.id());
                // comments stay after the old last member
                let member_trailing = blank_suffix(&trailing);
                let comma = editor.token_with_trivia(SyntaxKind::Comma, ",", Vec::new(), trailing);
                let member = editor.with_leading_trivia(member, leading);
                let member = editor.with_trailing_trivia(member, member_trailing);
                children.splice(last.index()..last.index() + 1, [bare, comma, member]);
            }
        }
        let replacement = editor.node(SyntaxKind::EnumDeclaration, children);
        Ok(Some(RewriteResult::replace(node, replacement)))
    }
}
