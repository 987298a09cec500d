//! Replace `First()`, `Last()` and `ElementAt(i)` with an indexer
//!
//! Offered only for receivers with a positional indexer: `items.First()`
//! becomes `items[0]`, `items.Last()` becomes `items[items.Count - 1]`
//! (`Length` for arrays) and `items.ElementAt(i)` becomes `items[i]`.
//! Calls with comments between the receiver and the closing parenthesis
//! are left alone, as are `Last()` calls whose receiver holds a comment.

use super::replace_any_with_count_or_length::count_or_length;
use crate::apply::RewriteResult;
use crate::builders::factory;
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::syntax::ast::{AstNode, InvocationExpression, MemberAccessExpression};
use refit_core::span::all_whitespace_or_end_of_line;
use refit_core::{Result, SyntaxKind, SyntaxNode, TextRange, TreeEditor};

pub const RULE_ID: &str = "replace-method-with-element-access";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Replace method invocation with element access",
        "Use the indexer instead of First, Last or ElementAt",
    )
    .with_tags(&["linq", "collection"])
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementMethod {
    First,
    /// Carries the size property used to find the last index
    Last(&'static str),
    ElementAt,
}

impl ElementMethod {
    fn name(self) -> &'static str {
        match self {
            Self::First => "First",
            Self::Last(_) => "Last",
            Self::ElementAt => "ElementAt",
        }
    }

    fn argument_count(self) -> usize {
        match self {
            Self::ElementAt => 1,
            Self::First | Self::Last(_) => 0,
        }
    }
}

#[derive(Debug)]
pub struct ElementAccessMatch {
    invocation: InvocationExpression,
    receiver: SyntaxNode,
    method: ElementMethod,
}

#[derive(Debug, Default)]
pub struct ReplaceMethodWithElementAccess;

#[async_trait]
impl Rule for ReplaceMethodWithElementAccess {
    type Match = ElementAccessMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::InvocationExpression]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<ElementAccessMatch>>> {
        let Some(invocation) = InvocationExpression::cast(node.clone()) else {
            return Ok(Vec::new());
        };
        let Some(access) = invocation.expression().and_then(MemberAccessExpression::cast) else {
            return Ok(Vec::new());
        };
        let Some(receiver) = access.expression() else {
            return Ok(Vec::new());
        };
        let method = match access.name_text().as_deref() {
            Some("First") => ElementMethod::First,
            Some("Last") => ElementMethod::Last(""),
            Some("ElementAt") => ElementMethod::ElementAt,
            _ => return Ok(Vec::new()),
        };
        if invocation.argument_list().is_none()
            || invocation.arguments().len() != method.argument_count()
        {
            return Ok(Vec::new());
        }
        // the receiver is written twice for `Last()`
        let dropped = match method {
            ElementMethod::Last(_) => node.span(),
            ElementMethod::First | ElementMethod::ElementAt => {
                TextRange::new(receiver.span().end(), node.span().end())
            }
        };
        if !all_whitespace_or_end_of_line(node, dropped) {
            return Ok(Vec::new());
        }

        let model = ctx.semantic_model().await?;
        let Some(info) = model.method_of(node) else {
            return Ok(Vec::new());
        };
        if info.name != method.name()
            || info.parameter_count != method.argument_count() + 1
            || !(info.is_enumerable_extension || info.is_immutable_array_extension)
        {
            return Ok(Vec::new());
        }
        let Some(ty) = model.type_of(&receiver) else {
            return Ok(Vec::new());
        };
        if !(ty.is_array() || ty.has_public_indexer) {
            return Ok(Vec::new());
        }
        let method = match method {
            ElementMethod::ElementAt => method,
            ElementMethod::First | ElementMethod::Last(_) => {
                let Some(property) = count_or_length(&ty) else {
                    return Ok(Vec::new());
                };
                if method == ElementMethod::First {
                    method
                } else {
                    ElementMethod::Last(property)
                }
            }
        };

        tracing::trace!(method = method.name(), receiver = %ty, "Element access applies");
        Ok(vec![Candidate::new(
            format!("Replace '{}' with '[]'", method.name()),
            RULE_ID,
            ElementAccessMatch {
                invocation,
                receiver,
                method,
            },
        )])
    }

    fn build(
        &self,
        found: &ElementAccessMatch,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let argument = match found.method {
            ElementMethod::First => factory::numeric_literal(editor, 0),
            ElementMethod::Last(property) => {
                let receiver = editor.without_trivia(found.receiver.id());
                let name = factory::identifier_name(editor, property);
                let size = factory::member_access(editor, receiver, name);
                let one = factory::numeric_literal(editor, 1);
                factory::binary(editor, SyntaxKind::SubtractExpression, size, one)?
            }
            ElementMethod::ElementAt => {
                let Some(index) = found.invocation.arguments().into_iter().next() else {
                    return Ok(None);
                };
                editor.without_trivia(index.id())
            }
        };
        let receiver = editor.without_trailing_trivia(found.receiver.id());
        let element_access = factory::element_access(editor, receiver, argument);
        let node = found.invocation.syntax();
        let element_access = editor.with_trivia_from(element_access, node.id());
        Ok(Some(RewriteResult::replace(node, element_access)))
    }
}
