//! Typed constructors for new syntax
//!
//! Everything built here carries minimal trivia: operators are surrounded
//! by single spaces, everything else has none. Callers move trivia from
//! the nodes being replaced onto the result.

use refit_core::{NodeId, RefitError, Result, SyntaxKind, Trivia, TreeEditor};

/// Token with its fixed text and no trivia
pub fn token(editor: &mut TreeEditor, kind: SyntaxKind) -> NodeId {
    editor.fixed_token(kind)
}

/// Token with its fixed text and a space on each side
pub fn spaced_token(editor: &mut TreeEditor, kind: SyntaxKind) -> NodeId {
    let text = kind.fixed_text().unwrap_or_default();
    editor.token_with_trivia(kind, text, vec![Trivia::space()], vec![Trivia::space()])
}

pub fn identifier(editor: &mut TreeEditor, name: &str) -> NodeId {
    editor.token(SyntaxKind::Identifier, name)
}

pub fn identifier_name(editor: &mut TreeEditor, name: &str) -> NodeId {
    let identifier = identifier(editor, name);
    editor.node(SyntaxKind::IdentifierName, vec![identifier])
}

/// Decimal literal; negative values become a unary minus
pub fn numeric_literal(editor: &mut TreeEditor, value: i128) -> NodeId {
    let digits = editor.token(SyntaxKind::NumericLiteral, value.unsigned_abs().to_string());
    let literal = editor.node(SyntaxKind::NumericLiteralExpression, vec![digits]);
    if value < 0 {
        let minus = token(editor, SyntaxKind::Minus);
        return editor.node(SyntaxKind::UnaryMinusExpression, vec![minus, literal]);
    }
    literal
}

pub fn bool_literal(editor: &mut TreeEditor, value: bool) -> NodeId {
    let (token_kind, kind) = if value {
        (SyntaxKind::TrueKw, SyntaxKind::TrueLiteralExpression)
    } else {
        (SyntaxKind::FalseKw, SyntaxKind::FalseLiteralExpression)
    };
    let keyword = token(editor, token_kind);
    editor.node(kind, vec![keyword])
}

/// `left op right` for a binary expression kind
pub fn binary(
    editor: &mut TreeEditor,
    kind: SyntaxKind,
    left: NodeId,
    right: NodeId,
) -> Result<NodeId> {
    let operator = kind.binary_operator_token().ok_or_else(|| {
        RefitError::contract_violation(format!("{kind:?} is not a binary expression"))
    })?;
    let operator = spaced_token(editor, operator);
    Ok(editor.node(kind, vec![left, operator, right]))
}

/// `op operand` for a prefix unary expression kind
pub fn prefix_unary(editor: &mut TreeEditor, kind: SyntaxKind, operand: NodeId) -> Result<NodeId> {
    let operator = match kind {
        SyntaxKind::UnaryPlusExpression => SyntaxKind::Plus,
        SyntaxKind::UnaryMinusExpression => SyntaxKind::Minus,
        SyntaxKind::LogicalNotExpression => SyntaxKind::Exclamation,
        SyntaxKind::BitwiseNotExpression => SyntaxKind::Tilde,
        SyntaxKind::PreIncrementExpression => SyntaxKind::PlusPlus,
        SyntaxKind::PreDecrementExpression => SyntaxKind::MinusMinus,
        _ => {
            return Err(RefitError::contract_violation(format!(
                "{kind:?} is not a prefix unary expression"
            )));
        }
    };
    let operator = token(editor, operator);
    Ok(editor.node(kind, vec![operator, operand]))
}

/// `(expression)`, with the expression's outer trivia moved outside
pub fn parenthesize(editor: &mut TreeEditor, expression: NodeId) -> NodeId {
    let leading = editor.leading_trivia(expression);
    let trailing = editor.trailing_trivia(expression);
    let inner = editor.without_trivia(expression);
    let open = editor.token_with_trivia(SyntaxKind::OpenParen, "(", leading, Vec::new());
    let close = editor.token_with_trivia(SyntaxKind::CloseParen, ")", Vec::new(), trailing);
    editor.node(SyntaxKind::ParenthesizedExpression, vec![open, inner, close])
}

/// `expression.name`
pub fn member_access(editor: &mut TreeEditor, expression: NodeId, name: NodeId) -> NodeId {
    let dot = token(editor, SyntaxKind::Dot);
    editor.node(
        SyntaxKind::SimpleMemberAccessExpression,
        vec![expression, dot, name],
    )
}

/// `expression[argument]`
pub fn element_access(editor: &mut TreeEditor, expression: NodeId, argument: NodeId) -> NodeId {
    let open = token(editor, SyntaxKind::OpenBracket);
    let argument = editor.node(SyntaxKind::Argument, vec![argument]);
    let close = token(editor, SyntaxKind::CloseBracket);
    let list = editor.node(
        SyntaxKind::BracketedArgumentList,
        vec![open, argument, close],
    );
    editor.node(SyntaxKind::ElementAccessExpression, vec![expression, list])
}

/// ` = value`
pub fn equals_value_clause(editor: &mut TreeEditor, value: NodeId) -> NodeId {
    let equals = spaced_token(editor, SyntaxKind::Equals);
    editor.node(SyntaxKind::EqualsValueClause, vec![equals, value])
}

/// `Name` or `Name = value`
pub fn enum_member(editor: &mut TreeEditor, name: &str, value: Option<NodeId>) -> NodeId {
    let mut children = vec![identifier(editor, name)];
    if let Some(value) = value {
        children.push(equals_value_clause(editor, value));
    }
    editor.node(SyntaxKind::EnumMemberDeclaration, children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::syntax::parse;

    fn editor() -> TreeEditor {
        TreeEditor::new(&parse("").unwrap())
    }

    #[test]
    fn test_binary_with_spaces() {
        let mut editor = editor();
        let left = identifier_name(&mut editor, "count");
        let right = numeric_literal(&mut editor, 0);
        let node = binary(&mut editor, SyntaxKind::GreaterThanExpression, left, right).unwrap();
        assert_eq!(editor.text(node), "count > 0");
    }

    #[test]
    fn test_negative_literal() {
        let mut editor = editor();
        let node = numeric_literal(&mut editor, -128);
        assert_eq!(editor.kind(node), SyntaxKind::UnaryMinusExpression);
        assert_eq!(editor.text(node), "-128");
    }

    #[test]
    fn test_parenthesize_moves_trivia_outside() {
        let mut editor = editor();
        let name = identifier_name(&mut editor, "a");
        let name = editor.with_leading_trivia(name, vec![Trivia::space()]);
        let node = parenthesize(&mut editor, name);
        assert_eq!(editor.text(node), " (a)");
    }

    #[test]
    fn test_element_access_and_enum_member() {
        let mut editor = editor();
        let receiver = identifier_name(&mut editor, "items");
        let index = numeric_literal(&mut editor, 3);
        let node = element_access(&mut editor, receiver, index);
        assert_eq!(editor.text(node), "items[3]");

        let value = numeric_literal(&mut editor, 4);
        let member = enum_member(&mut editor, "C", Some(value));
        assert_eq!(editor.text(member), "C = 4");
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "contract violation"))]
    fn test_not_a_binary_kind() {
        let mut editor = editor();
        let a = identifier_name(&mut editor, "a");
        let b = identifier_name(&mut editor, "b");
        assert!(binary(&mut editor, SyntaxKind::Block, a, b).is_err());
    }
}
