//! Trivia helpers for builders
//!
//! Builders never drop comments silently: whenever tokens disappear from
//! the tree, their comments are collected with [`comments_in`] and
//! re-emitted next to the code that replaces them.

use refit_core::syntax::trivia::is_whitespace_or_end_of_line;
use refit_core::{SyntaxKind, SyntaxNode, SyntaxTree, Trivia};

/// End-of-line text used by the document, or `default` if it has none
pub fn newline_for(tree: &SyntaxTree, default: &str) -> String {
    tree.root()
        .descendant_tokens()
        .flat_map(|token| {
            let mut trivia = token.leading_trivia();
            trivia.extend(token.trailing_trivia());
            trivia
        })
        .find(Trivia::is_end_of_line)
        .map(|eol| eol.text)
        .unwrap_or_else(|| default.to_string())
}

/// Indentation of the line holding the nearest enclosing statement or member
///
/// An `if` that is the body of an `else` clause is indented like the
/// `else` keyword.
pub fn indent_trivia(node: &SyntaxNode) -> Vec<Trivia> {
    let anchor = node.ancestors_and_self().find_map(|n| match n.kind() {
        SyntaxKind::IfStatement => Some(
            n.parent()
                .filter(|p| p.kind() == SyntaxKind::ElseClause)
                .unwrap_or(n),
        ),
        kind if kind.is_statement() || kind.is_member_declaration() => Some(n),
        _ => None,
    });
    anchor
        .map(|n| whitespace_suffix(&n.leading_trivia()))
        .unwrap_or_default()
}

/// Comment items of `trivia`, in order
pub fn comments_in(trivia: &[Trivia]) -> Vec<Trivia> {
    trivia.iter().filter(|t| t.is_comment()).cloned().collect()
}

/// Comments in the leading and trailing trivia of every token of `node`
pub fn comments_of(node: &SyntaxNode) -> Vec<Trivia> {
    node.descendant_tokens()
        .flat_map(|token| {
            let mut trivia = token.leading_trivia();
            trivia.extend(token.trailing_trivia());
            comments_in(&trivia)
        })
        .collect()
}

/// The trailing run of plain whitespace
pub fn whitespace_suffix(trivia: &[Trivia]) -> Vec<Trivia> {
    let start = trivia
        .iter()
        .rposition(|t| !t.is_whitespace())
        .map_or(0, |i| i + 1);
    trivia[start..].to_vec()
}

/// `trivia` without its trailing run of whitespace and line breaks
pub fn trim_end(trivia: &[Trivia]) -> Vec<Trivia> {
    let end = trivia
        .iter()
        .rposition(|t| !t.is_whitespace_or_end_of_line())
        .map_or(0, |i| i + 1);
    trivia[..end].to_vec()
}

/// The trailing run of whitespace and line breaks
pub fn blank_suffix(trivia: &[Trivia]) -> Vec<Trivia> {
    let end = trim_end(trivia).len();
    trivia[end..].to_vec()
}

pub fn ends_with_end_of_line(trivia: &[Trivia]) -> bool {
    trivia.last().is_some_and(Trivia::is_end_of_line)
}

pub fn contains_end_of_line(trivia: &[Trivia]) -> bool {
    trivia.iter().any(Trivia::is_end_of_line)
}

/// Only whitespace and line breaks, or nothing at all
pub fn is_blank(trivia: &[Trivia]) -> bool {
    is_whitespace_or_end_of_line(trivia)
}

/// Re-indent leading trivia: every line it starts gets `indent`
///
/// Existing indentation is discarded, comments and line breaks are kept.
pub fn reindent(trivia: &[Trivia], indent: &[Trivia]) -> Vec<Trivia> {
    let mut out = indent.to_vec();
    for item in trivia {
        if item.is_whitespace() {
            continue;
        }
        out.push(item.clone());
        if item.is_end_of_line() {
            out.extend_from_slice(indent);
        }
    }
    out
}

/// Each comment on a line of its own, indented, ending with `newline`
pub fn comment_lines(comments: &[Trivia], indent: &[Trivia], newline: &str) -> Vec<Trivia> {
    let mut out = Vec::new();
    for comment in comments {
        out.extend_from_slice(indent);
        out.push(comment.clone());
        out.push(Trivia::end_of_line(newline));
    }
    out
}

/// Comments placed at the end of a line, each preceded by a space
pub fn inline_comments(comments: &[Trivia]) -> Vec<Trivia> {
    comments
        .iter()
        .flat_map(|comment| [Trivia::space(), comment.clone()])
        .collect()
}
