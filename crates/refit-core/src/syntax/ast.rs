//! Typed wrappers over syntax nodes
//!
//! Each wrapper checks the node kind in `cast()` and exposes the children a
//! rule needs by name. Accessors return `None` when the tree is missing a
//! part rather than panicking.
//!
//! # Example
//!
//! ```
//! use refit_core::syntax::{parse, SyntaxKind};
//! use refit_core::syntax::ast::{AstNode, IfStatement};
//!
//! let tree = parse("class C { void M() { if (a) b(); } }").unwrap();
//! let node = tree
//!     .root()
//!     .descendants()
//!     .find(|n| n.kind() == SyntaxKind::IfStatement)
//!     .unwrap();
//! let if_statement = IfStatement::cast(node).unwrap();
//! assert_eq!(if_statement.condition().unwrap().trimmed_text(), "a");
//! assert!(if_statement.else_clause().is_none());
//! ```

use super::{SyntaxKind, SyntaxNode};

/// Helper trait for casting syntax nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident => $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

fn token_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    parent.child_tokens().find(|t| t.kind() == kind)
}

fn expression_children(parent: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> + use<> {
    parent.child_nodes().filter(|n| n.kind().is_expression())
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(
    /// `if (condition) statement [else ...]`
    IfStatement => IfStatement
);

impl IfStatement {
    pub fn if_keyword(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::IfKw)
    }

    pub fn condition(&self) -> Option<SyntaxNode> {
        expression_children(&self.syntax).next()
    }

    /// The statement executed when the condition holds
    pub fn statement(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().find(|n| n.kind().is_statement())
    }

    pub fn else_clause(&self) -> Option<ElseClause> {
        self.syntax.child_nodes().find_map(ElseClause::cast)
    }
}

ast_node!(ElseClause => ElseClause);

impl ElseClause {
    pub fn else_keyword(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::ElseKw)
    }

    pub fn statement(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().find(|n| n.kind().is_statement())
    }
}

ast_node!(Block => Block);

impl Block {
    pub fn open_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::OpenBrace)
    }

    pub fn close_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::CloseBrace)
    }

    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.child_nodes()
    }
}

ast_node!(LocalDeclarationStatement => LocalDeclarationStatement);

impl LocalDeclarationStatement {
    pub fn is_const(&self) -> bool {
        token_of_kind(&self.syntax, SyntaxKind::ConstKw).is_some()
    }

    pub fn declaration(&self) -> Option<VariableDeclaration> {
        self.syntax.child_nodes().find_map(VariableDeclaration::cast)
    }

    pub fn semicolon(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Semicolon)
    }
}

ast_node!(VariableDeclaration => VariableDeclaration);

impl VariableDeclaration {
    pub fn ty(&self) -> Option<SyntaxNode> {
        self.syntax
            .child_nodes()
            .find(|n| n.kind() != SyntaxKind::VariableDeclarator)
    }

    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> + use<> {
        self.syntax.child_nodes().filter_map(VariableDeclarator::cast)
    }
}

ast_node!(VariableDeclarator => VariableDeclarator);

impl VariableDeclarator {
    pub fn identifier(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Identifier)
    }

    pub fn name(&self) -> Option<String> {
        self.identifier().map(|t| t.token_text().to_string())
    }

    pub fn initializer(&self) -> Option<EqualsValueClause> {
        self.syntax.child_nodes().find_map(EqualsValueClause::cast)
    }
}

ast_node!(
    /// `= value`, used by declarators, enum members and parameters
    EqualsValueClause => EqualsValueClause
);

impl EqualsValueClause {
    pub fn equals_token(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Equals)
    }

    pub fn value(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }
}

ast_node!(ReturnStatement => ReturnStatement);

impl ReturnStatement {
    pub fn return_keyword(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::ReturnKw)
    }

    pub fn expression(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }

    pub fn semicolon(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Semicolon)
    }
}

ast_node!(SwitchSection => SwitchSection);

impl SwitchSection {
    pub fn labels(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.child_nodes().filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::CaseSwitchLabel | SyntaxKind::DefaultSwitchLabel
            )
        })
    }

    pub fn statements(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax.child_nodes().filter(|n| n.kind().is_statement())
    }
}

// ============================================================================
// Declarations
// ============================================================================

ast_node!(
    /// Any declaration whose body is a list of member declarations
    MemberContainer => NamespaceDeclaration | ClassDeclaration | StructDeclaration | InterfaceDeclaration
);

impl MemberContainer {
    pub fn open_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::OpenBrace)
    }

    pub fn close_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::CloseBrace)
    }

    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax
            .child_nodes()
            .filter(|n| n.kind().is_member_declaration())
    }
}

ast_node!(EnumDeclaration => EnumDeclaration);

impl EnumDeclaration {
    pub fn identifier(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Identifier)
    }

    pub fn name(&self) -> Option<String> {
        self.identifier().map(|t| t.token_text().to_string())
    }

    /// The underlying type after `:`
    pub fn base_type(&self) -> Option<SyntaxNode> {
        self.syntax
            .child_of_kind(SyntaxKind::BaseList)?
            .child_nodes()
            .next()
    }

    pub fn attribute_lists(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax
            .child_nodes()
            .filter(|n| n.kind() == SyntaxKind::AttributeList)
    }

    pub fn open_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::OpenBrace)
    }

    pub fn close_brace(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::CloseBrace)
    }

    pub fn members(&self) -> impl Iterator<Item = EnumMemberDeclaration> + use<> {
        self.syntax
            .child_nodes()
            .filter_map(EnumMemberDeclaration::cast)
    }

    /// Commas between (and possibly after) the members
    pub fn separators(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.syntax
            .child_tokens()
            .filter(|t| t.kind() == SyntaxKind::Comma)
    }
}

ast_node!(EnumMemberDeclaration => EnumMemberDeclaration);

impl EnumMemberDeclaration {
    pub fn identifier(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Identifier)
    }

    pub fn name(&self) -> Option<String> {
        self.identifier().map(|t| t.token_text().to_string())
    }

    pub fn equals_value(&self) -> Option<EqualsValueClause> {
        self.syntax.child_nodes().find_map(EqualsValueClause::cast)
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(InvocationExpression => InvocationExpression);

impl InvocationExpression {
    /// The invoked expression, usually a name or member access
    pub fn expression(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }

    pub fn argument_list(&self) -> Option<SyntaxNode> {
        self.syntax.child_of_kind(SyntaxKind::ArgumentList)
    }

    /// Expressions of the arguments in order
    pub fn arguments(&self) -> Vec<SyntaxNode> {
        self.argument_list()
            .map(|list| {
                list.child_nodes()
                    .filter_map(|argument| argument.child_nodes().next())
                    .collect()
            })
            .unwrap_or_default()
    }
}

ast_node!(MemberAccessExpression => SimpleMemberAccessExpression);

impl MemberAccessExpression {
    pub fn expression(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }

    pub fn dot(&self) -> Option<SyntaxNode> {
        token_of_kind(&self.syntax, SyntaxKind::Dot)
    }

    /// The accessed member name
    pub fn name(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().nth(1)
    }

    pub fn name_text(&self) -> Option<String> {
        let name = self.name()?;
        Some(name.first_token()?.token_text().to_string())
    }
}

ast_node!(BinaryExpression => MultiplyExpression | DivideExpression | ModuloExpression
    | AddExpression | SubtractExpression | LeftShiftExpression | RightShiftExpression
    | LessThanExpression | LessThanOrEqualExpression | GreaterThanExpression
    | GreaterThanOrEqualExpression | IsExpression | AsExpression | EqualsExpression
    | NotEqualsExpression | BitwiseAndExpression | ExclusiveOrExpression
    | BitwiseOrExpression | LogicalAndExpression | LogicalOrExpression | CoalesceExpression);

impl BinaryExpression {
    pub fn left(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }

    pub fn operator(&self) -> Option<SyntaxNode> {
        self.syntax.child_tokens().next()
    }

    /// Right operand; a type for `is` and `as`
    pub fn right(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().nth(1)
    }
}

ast_node!(PrefixUnaryExpression => UnaryPlusExpression | UnaryMinusExpression
    | LogicalNotExpression | BitwiseNotExpression | PreIncrementExpression
    | PreDecrementExpression);

impl PrefixUnaryExpression {
    pub fn operator(&self) -> Option<SyntaxNode> {
        self.syntax.child_tokens().next()
    }

    pub fn operand(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }
}

ast_node!(ParenthesizedExpression => ParenthesizedExpression);

impl ParenthesizedExpression {
    pub fn expression(&self) -> Option<SyntaxNode> {
        self.syntax.child_nodes().next()
    }
}
