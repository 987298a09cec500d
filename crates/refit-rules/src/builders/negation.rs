//! Logical negation of boolean expressions
//!
//! Negation pushes through the expression where it can: comparison
//! operators flip, `&&`/`||` and `&`/`|` follow De Morgan, conditionals
//! negate both branches, `!x` unwraps and boolean literals swap. Other
//! supported expressions get a `!`, parenthesized first when binding
//! would change. The negated expression keeps the trivia of the original.

use super::factory;
use super::trivia::comments_in;
use refit_core::{NodeId, RefitError, Result, SyntaxKind, SyntaxNode, Trivia, TreeEditor};

/// Binding strength of an expression kind, lower binds tighter
///
/// `None` for kinds negation does not know about.
pub fn precedence(kind: SyntaxKind) -> Option<u8> {
    use SyntaxKind::*;
    let level = match kind {
        IdentifierName
        | GenericName
        | PredefinedType
        | ThisExpression
        | ParenthesizedExpression
        | SimpleMemberAccessExpression
        | InvocationExpression
        | ElementAccessExpression
        | PostIncrementExpression
        | PostDecrementExpression
        | ObjectCreationExpression
        | ArrayCreationExpression
        | TypeOfExpression
        | DefaultExpression
        | CheckedExpression => 0,
        kind if kind.is_literal_expression() => 0,
        UnaryPlusExpression
        | UnaryMinusExpression
        | LogicalNotExpression
        | BitwiseNotExpression
        | PreIncrementExpression
        | PreDecrementExpression
        | CastExpression => 1,
        MultiplyExpression | DivideExpression | ModuloExpression => 2,
        AddExpression | SubtractExpression => 3,
        LeftShiftExpression | RightShiftExpression => 4,
        LessThanExpression
        | LessThanOrEqualExpression
        | GreaterThanExpression
        | GreaterThanOrEqualExpression
        | IsExpression
        | AsExpression => 5,
        EqualsExpression | NotEqualsExpression => 6,
        BitwiseAndExpression => 7,
        ExclusiveOrExpression => 8,
        BitwiseOrExpression => 9,
        LogicalAndExpression => 10,
        LogicalOrExpression => 11,
        CoalesceExpression => 12,
        ConditionalExpression => 13,
        kind if kind.is_assignment_expression() => 14,
        _ => return None,
    };
    Some(level)
}

/// Expression kind with the opposite truth value, for flippable binaries
pub fn negated_binary_kind(kind: SyntaxKind) -> Option<SyntaxKind> {
    use SyntaxKind::*;
    let negated = match kind {
        LessThanExpression => GreaterThanOrEqualExpression,
        LessThanOrEqualExpression => GreaterThanExpression,
        GreaterThanExpression => LessThanOrEqualExpression,
        GreaterThanOrEqualExpression => LessThanExpression,
        EqualsExpression => NotEqualsExpression,
        NotEqualsExpression => EqualsExpression,
        BitwiseAndExpression => BitwiseOrExpression,
        BitwiseOrExpression => BitwiseAndExpression,
        LogicalAndExpression => LogicalOrExpression,
        LogicalOrExpression => LogicalAndExpression,
        _ => return None,
    };
    Some(negated)
}

/// Operator token with the opposite meaning
pub fn negated_operator(token: SyntaxKind) -> Option<SyntaxKind> {
    let expression = SyntaxKind::binary_expression_for(token)?;
    negated_binary_kind(expression)?.binary_operator_token()
}

/// Whether [`logically_negate`] supports `expression`, operands included
pub fn can_negate(expression: &SyntaxNode) -> bool {
    use SyntaxKind::*;
    match expression.kind() {
        BitwiseAndExpression | BitwiseOrExpression | LogicalAndExpression | LogicalOrExpression => {
            expression.child_nodes().all(|operand| can_negate(&operand))
        }
        ParenthesizedExpression => expression
            .child_nodes()
            .next()
            .is_some_and(|inner| can_negate(&inner)),
        ConditionalExpression => expression
            .child_nodes()
            .skip(1)
            .all(|branch| can_negate(&branch)),
        SimpleMemberAccessExpression
        | InvocationExpression
        | ElementAccessExpression
        | PostIncrementExpression
        | PostDecrementExpression
        | ObjectCreationExpression
        | TypeOfExpression
        | DefaultExpression
        | CheckedExpression
        | IdentifierName
        | LogicalNotExpression
        | CastExpression
        | IsExpression
        | AsExpression
        | ExclusiveOrExpression
        | LessThanExpression
        | LessThanOrEqualExpression
        | GreaterThanExpression
        | GreaterThanOrEqualExpression
        | EqualsExpression
        | NotEqualsExpression
        | TrueLiteralExpression
        | FalseLiteralExpression => true,
        kind => kind.is_assignment_expression(),
    }
}

/// Negate `expression`, keeping its outer trivia
pub fn logically_negate(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let negated = negate(editor, expression)?;
    let negated = editor.with_trivia_from(negated, expression);
    if editor.kind(expression) != SyntaxKind::LogicalNotExpression {
        return Ok(negated);
    }
    // comments between `!` and its operand would vanish with the operator
    let children = editor.children(expression);
    let mut inner = Vec::new();
    if let [operator, operand] = children[..] {
        inner.extend(editor.trailing_trivia(operator));
        inner.extend(editor.leading_trivia(operand));
    }
    let comments = comments_in(&inner);
    if comments.is_empty() {
        return Ok(negated);
    }
    let mut leading = editor.leading_trivia(negated);
    for comment in comments {
        leading.push(comment);
        leading.push(Trivia::space());
    }
    Ok(editor.with_leading_trivia(negated, leading))
}

fn negate(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    use SyntaxKind::*;
    let kind = editor.kind(expression);
    match kind {
        SimpleMemberAccessExpression
        | InvocationExpression
        | ElementAccessExpression
        | PostIncrementExpression
        | PostDecrementExpression
        | ObjectCreationExpression
        | TypeOfExpression
        | DefaultExpression
        | CheckedExpression
        | IdentifierName => logical_not(editor, expression),
        LogicalNotExpression => editor
            .children(expression)
            .get(1)
            .copied()
            .ok_or_else(|| RefitError::contract_violation("`!` without an operand")),
        CastExpression | IsExpression | AsExpression | ExclusiveOrExpression => {
            logical_not_with_parentheses(editor, expression)
        }
        kind if kind.is_assignment_expression() => logical_not_with_parentheses(editor, expression),
        LessThanExpression
        | LessThanOrEqualExpression
        | GreaterThanExpression
        | GreaterThanOrEqualExpression
        | EqualsExpression
        | NotEqualsExpression => negate_operator(editor, expression),
        BitwiseAndExpression | BitwiseOrExpression | LogicalAndExpression | LogicalOrExpression => {
            negate_binary(editor, expression)
        }
        ConditionalExpression => negate_conditional(editor, expression),
        TrueLiteralExpression => Ok(factory::bool_literal(editor, false)),
        FalseLiteralExpression => Ok(factory::bool_literal(editor, true)),
        ParenthesizedExpression => {
            let children = editor.children(expression);
            let index = children
                .iter()
                .position(|&c| editor.kind(c).is_expression())
                .ok_or_else(|| RefitError::contract_violation("empty parentheses"))?;
            let inner = logically_negate(editor, children[index])?;
            Ok(editor.with_child(expression, index, inner))
        }
        _ => Err(RefitError::contract_violation(format!(
            "cannot logically negate {kind:?}"
        ))),
    }
}

fn logical_not(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let operand = editor.without_trivia(expression);
    factory::prefix_unary(editor, SyntaxKind::LogicalNotExpression, operand)
}

fn logical_not_with_parentheses(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let operand = editor.without_trivia(expression);
    let operand = if editor.kind(operand) == SyntaxKind::ParenthesizedExpression {
        operand
    } else {
        factory::parenthesize(editor, operand)
    };
    factory::prefix_unary(editor, SyntaxKind::LogicalNotExpression, operand)
}

/// Flip the operator token, keeping its trivia
fn flip_operator(editor: &mut TreeEditor, operator: NodeId) -> Result<NodeId> {
    let kind = editor.kind(operator);
    let flipped = negated_operator(kind).ok_or_else(|| {
        RefitError::contract_violation(format!("operator {kind:?} has no negation"))
    })?;
    let leading = editor.leading_trivia(operator);
    let trailing = editor.trailing_trivia(operator);
    let text = flipped.fixed_text().unwrap_or_default();
    Ok(editor.token_with_trivia(flipped, text, leading, trailing))
}

fn binary_parts(editor: &TreeEditor, expression: NodeId) -> Result<(NodeId, NodeId, NodeId)> {
    match editor.children(expression)[..] {
        [left, operator, right] => Ok((left, operator, right)),
        _ => Err(RefitError::contract_violation(
            "binary expression without two operands",
        )),
    }
}

fn negated_kind(kind: SyntaxKind) -> Result<SyntaxKind> {
    negated_binary_kind(kind)
        .ok_or_else(|| RefitError::contract_violation(format!("{kind:?} has no negation")))
}

fn negate_operator(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let kind = negated_kind(editor.kind(expression))?;
    let (left, operator, right) = binary_parts(editor, expression)?;
    let operator = flip_operator(editor, operator)?;
    Ok(editor.node(kind, vec![left, operator, right]))
}

fn negate_binary(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let kind = negated_kind(editor.kind(expression))?;
    let (left, operator, right) = binary_parts(editor, expression)?;
    let left = negate_operand(editor, left, kind)?;
    let operator = flip_operator(editor, operator)?;
    let right = negate_operand(editor, right, kind)?;
    Ok(editor.node(kind, vec![left, operator, right]))
}

fn negate_conditional(editor: &mut TreeEditor, expression: NodeId) -> Result<NodeId> {
    let mut children = editor.children(expression);
    let position = |kind| children.iter().position(|&c| editor.kind(c) == kind);
    let (Some(question), Some(colon)) = (
        position(SyntaxKind::Question),
        position(SyntaxKind::Colon),
    ) else {
        return Err(RefitError::contract_violation(
            "conditional expression without branches",
        ));
    };
    for index in [question + 1, colon + 1] {
        let branch = *children.get(index).ok_or_else(|| {
            RefitError::contract_violation("conditional expression without branches")
        })?;
        children[index] = negate_operand(editor, branch, SyntaxKind::ConditionalExpression)?;
    }
    Ok(editor.node(SyntaxKind::ConditionalExpression, children))
}

fn negate_operand(editor: &mut TreeEditor, operand: NodeId, parent: SyntaxKind) -> Result<NodeId> {
    let negated = logically_negate(editor, operand)?;
    let negated = parenthesize_if_necessary(editor, negated, parent);
    Ok(editor.with_trivia_from(negated, operand))
}

fn parenthesize_if_necessary(editor: &mut TreeEditor, expression: NodeId, parent: SyntaxKind) -> NodeId {
    let needs = match (precedence(editor.kind(expression)), precedence(parent)) {
        (Some(inner), Some(outer)) => inner > outer,
        _ => true,
    };
    if needs {
        factory::parenthesize(editor, expression)
    } else {
        expression
    }
}
