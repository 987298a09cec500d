//! Replace a parameterless `Any()` with a `Count` or `Length` check
//!
//! `items.Any()` walks an enumerator; collections already know their size.
//! For arrays and immutable arrays the check uses `Length`, for other
//! `ICollection<T>` implementations `Count`. `!items.Any()` becomes an
//! `== 0` comparison.

use crate::apply::RewriteResult;
use crate::builders::factory;
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleCategory, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::span::all_whitespace_or_end_of_line;
use refit_core::syntax::ast::{AstNode, InvocationExpression, MemberAccessExpression, PrefixUnaryExpression};
use refit_core::syntax::trivia::is_whitespace_or_end_of_line;
use refit_core::{
    Diagnostic, Result, Severity, SyntaxKind, SyntaxNode, TextRange, TreeEditor, TypeInfo,
};

pub const RULE_ID: &str = "replace-any-with-count-or-length";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::analyzer(
        RULE_ID,
        "Replace Any with Count or Length",
        "Collections know their size, so checking it is cheaper than calling Any()",
        Severity::Info,
    )
    .with_category(RuleCategory::Performance)
    .with_tags(&["linq", "collection"])
});

#[derive(Debug, Default)]
pub struct ReplaceAnyWithCountOrLength;

#[derive(Debug)]
pub struct AnyMatch {
    invocation: SyntaxNode,
    access: MemberAccessExpression,
    /// The enclosing `!`, when the call is negated
    logical_not: Option<SyntaxNode>,
    property: &'static str,
    range: TextRange,
}

impl AnyMatch {
    fn replacement_text(&self) -> String {
        if self.logical_not.is_some() {
            format!("{} == 0", self.property)
        } else {
            format!("{} > 0", self.property)
        }
    }
}

/// `Length` for arrays, `Count` for other collections
pub fn count_or_length(ty: &TypeInfo) -> Option<&'static str> {
    if ty.is_error() || ty.is_constructed_from_ienumerable {
        return None;
    }
    if ty.is_array() || ty.is_immutable_array {
        Some("Length")
    } else if ty.implements_icollection && ty.has_public_count {
        Some("Count")
    } else {
        None
    }
}

#[async_trait]
impl Rule for ReplaceAnyWithCountOrLength {
    type Match = AnyMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    async fn matches(&self, node: &SyntaxNode, ctx: &MatchContext) -> Result<Vec<Candidate<AnyMatch>>> {
        let Some(invocation) = InvocationExpression::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let parent = node.parent();
        if parent
            .as_ref()
            .is_some_and(|p| p.kind() == SyntaxKind::SimpleMemberAccessExpression)
        {
            return Ok(Vec::new());
        }
        let Some(access) = invocation.expression().and_then(MemberAccessExpression::cast) else {
            return Ok(Vec::new());
        };
        let (Some(name), Some(receiver)) = (access.name(), access.expression()) else {
            return Ok(Vec::new());
        };
        if access.name_text().as_deref() != Some("Any") || !invocation.arguments().is_empty() {
            return Ok(Vec::new());
        }

        let range = TextRange::new(name.span().start(), node.span().end());
        if !all_whitespace_or_end_of_line(node, range) {
            return Ok(Vec::new());
        }
        let logical_not = parent.filter(|p| p.kind() == SyntaxKind::LogicalNotExpression);
        if let Some(not) = logical_not.as_ref().and_then(|n| PrefixUnaryExpression::cast(n.clone())) {
            let operator_trivia = not.operator().map(|t| t.trailing_trivia()).unwrap_or_default();
            if !is_whitespace_or_end_of_line(&operator_trivia)
                || !is_whitespace_or_end_of_line(&node.leading_trivia())
            {
                return Ok(Vec::new());
            }
        }

        let model = ctx.semantic_model().await?;
        let Some(method) = model.method_of(node) else {
            return Ok(Vec::new());
        };
        if method.name != "Any"
            || method.parameter_count != 1
            || !(method.is_enumerable_extension || method.is_immutable_array_extension)
        {
            return Ok(Vec::new());
        }
        let Some(property) = model.type_of(&receiver).as_ref().and_then(count_or_length) else {
            return Ok(Vec::new());
        };

        let found = AnyMatch {
            invocation: node.clone(),
            access,
            logical_not,
            property,
            range,
        };
        let title = format!("Replace 'Any' with '{}'", found.replacement_text());
        Ok(vec![Candidate::new(title, RULE_ID, found)])
    }

    fn build(&self, found: &AnyMatch, editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        let Some(name) = found.access.name() else {
            return Ok(None);
        };
        let property = factory::identifier_name(editor, found.property);
        let property = editor.with_trivia_from(property, name.id());
        let access = editor.with_child(found.access.syntax().id(), name.index(), property);
        let access = editor.without_trailing_trivia(access);
        let zero = factory::numeric_literal(editor, 0);

        let (original, kind) = match &found.logical_not {
            Some(not) => (not, SyntaxKind::EqualsExpression),
            None => (&found.invocation, SyntaxKind::GreaterThanExpression),
        };
        let comparison = factory::binary(editor, kind, access, zero)?;
        let comparison = editor.with_trivia_from(comparison, original.id());
        Ok(Some(RewriteResult::replace(original, comparison)))
    }

    fn diagnostic(&self, _node: &SyntaxNode, found: &AnyMatch) -> Option<Diagnostic> {
        Some(
            Diagnostic::new(
                RULE_ID,
                found.range,
                format!("Replace 'Any' with '{}'", found.replacement_text()),
            )
            .with_severity(METADATA.severity),
        )
    }
}
