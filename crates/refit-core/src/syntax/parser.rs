//! Recursive-descent parser for the fixture grammar
//!
//! The grammar is a compact C#-like subset: using directives, namespaces,
//! classes, structs, interfaces and enums with their members, the common
//! statements and the full binary/unary operator ladder. It exists so that
//! trees for tests and the command-line host can be produced from text;
//! it is not meant to accept every program.
//!
//! # Example
//!
//! ```
//! use refit_core::syntax::{parse, SyntaxKind};
//!
//! let tree = parse("class C { int F() { return 1; } }").unwrap();
//! assert_eq!(tree.text(), "class C { int F() { return 1; } }");
//! assert_eq!(tree.root().kind(), SyntaxKind::CompilationUnit);
//! ```

use super::arena::GreenToken;
use super::builder::{Checkpoint, TreeBuilder};
use super::kind::SyntaxKind::{self, *};
use super::lexer::{self, LexedToken};
use super::tree::SyntaxTree;
use crate::error::RefitError;
use crate::result::Result;

/// Parse a complete compilation unit
pub fn parse(text: &str) -> Result<SyntaxTree> {
    let tokens = lexer::lex(text)?;
    let mut parser = Parser::new(tokens);
    parser.compilation_unit()?;
    tracing::trace!("Parsed {} bytes", text.len());
    Ok(parser.finish())
}

struct Parser {
    tokens: Vec<LexedToken>,
    pos: usize,
    builder: TreeBuilder,
}

impl Parser {
    fn new(tokens: Vec<LexedToken>) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: TreeBuilder::new(),
        }
    }

    fn finish(self) -> SyntaxTree {
        self.builder.finish()
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn compilation_unit(&mut self) -> Result<()> {
        self.builder.start_node(CompilationUnit);
        while self.at(UsingKw) {
            self.using_directive()?;
        }
        while !self.at(EndOfFile) {
            self.namespace_member()?;
        }
        self.bump();
        self.builder.finish_node();
        Ok(())
    }

    fn using_directive(&mut self) -> Result<()> {
        self.builder.start_node(UsingDirective);
        self.bump();
        self.name()?;
        self.expect(Semicolon)?;
        self.builder.finish_node();
        Ok(())
    }

    fn namespace_member(&mut self) -> Result<()> {
        if self.at(NamespaceKw) {
            self.namespace_declaration()
        } else {
            self.member_declaration()
        }
    }

    fn namespace_declaration(&mut self) -> Result<()> {
        self.builder.start_node(NamespaceDeclaration);
        self.bump();
        self.name()?;
        self.expect(OpenBrace)?;
        while !self.at(CloseBrace) && !self.at(EndOfFile) {
            self.namespace_member()?;
        }
        self.expect(CloseBrace)?;
        self.builder.finish_node();
        Ok(())
    }

    fn member_declaration(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        while self.at(OpenBracket) {
            self.attribute_list()?;
        }
        while self.current().is_modifier_keyword() {
            self.bump();
        }

        match self.current() {
            ClassKw => self.type_declaration(checkpoint, ClassDeclaration),
            StructKw => self.type_declaration(checkpoint, StructDeclaration),
            InterfaceKw => self.type_declaration(checkpoint, InterfaceDeclaration),
            EnumKw => self.enum_declaration(checkpoint),
            Identifier if self.nth(1) == OpenParen => {
                self.builder.start_node_at(checkpoint, ConstructorDeclaration);
                self.bump();
                self.parameter_list()?;
                self.method_body()?;
                self.builder.finish_node();
                Ok(())
            }
            _ => {
                let type_checkpoint = self.builder.checkpoint();
                self.ty(true)?;
                if !self.at(Identifier) {
                    return Err(self.error("expected member name"));
                }
                match self.nth(1) {
                    OpenParen => {
                        self.builder.start_node_at(checkpoint, MethodDeclaration);
                        self.bump();
                        self.parameter_list()?;
                        self.method_body()?;
                        self.builder.finish_node();
                    }
                    OpenBrace => {
                        self.builder.start_node_at(checkpoint, PropertyDeclaration);
                        self.bump();
                        self.accessor_list()?;
                        self.builder.finish_node();
                    }
                    _ => {
                        self.builder.start_node_at(checkpoint, FieldDeclaration);
                        self.builder.start_node_at(type_checkpoint, VariableDeclaration);
                        self.variable_declarator()?;
                        while self.at(Comma) {
                            self.bump();
                            self.variable_declarator()?;
                        }
                        self.builder.finish_node();
                        self.expect(Semicolon)?;
                        self.builder.finish_node();
                    }
                }
                Ok(())
            }
        }
    }

    fn type_declaration(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) -> Result<()> {
        self.builder.start_node_at(checkpoint, kind);
        self.bump();
        self.expect(Identifier)?;
        if self.at(Colon) {
            self.base_list()?;
        }
        self.expect(OpenBrace)?;
        while !self.at(CloseBrace) && !self.at(EndOfFile) {
            self.member_declaration()?;
        }
        self.expect(CloseBrace)?;
        if self.at(Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
        Ok(())
    }

    fn enum_declaration(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.builder.start_node_at(checkpoint, EnumDeclaration);
        self.bump();
        self.expect(Identifier)?;
        if self.at(Colon) {
            self.base_list()?;
        }
        self.expect(OpenBrace)?;
        while !self.at(CloseBrace) {
            self.enum_member()?;
            if !self.at(Comma) {
                break;
            }
            self.bump();
        }
        self.expect(CloseBrace)?;
        if self.at(Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
        Ok(())
    }

    fn enum_member(&mut self) -> Result<()> {
        self.builder.start_node(EnumMemberDeclaration);
        while self.at(OpenBracket) {
            self.attribute_list()?;
        }
        self.expect(Identifier)?;
        if self.at(Equals) {
            self.equals_value_clause()?;
        }
        self.builder.finish_node();
        Ok(())
    }

    fn base_list(&mut self) -> Result<()> {
        self.builder.start_node(BaseList);
        self.bump();
        self.ty(true)?;
        while self.at(Comma) {
            self.bump();
            self.ty(true)?;
        }
        self.builder.finish_node();
        Ok(())
    }

    fn attribute_list(&mut self) -> Result<()> {
        self.builder.start_node(AttributeList);
        self.bump();
        loop {
            self.builder.start_node(Attribute);
            self.name()?;
            if self.at(OpenParen) {
                self.argument_list()?;
            }
            self.builder.finish_node();
            if !self.at(Comma) {
                break;
            }
            self.bump();
        }
        self.expect(CloseBracket)?;
        self.builder.finish_node();
        Ok(())
    }

    fn parameter_list(&mut self) -> Result<()> {
        self.builder.start_node(ParameterList);
        self.expect(OpenParen)?;
        if !self.at(CloseParen) {
            loop {
                self.builder.start_node(Parameter);
                while self.at(OpenBracket) {
                    self.attribute_list()?;
                }
                if self.at(ThisKw) {
                    self.bump();
                }
                self.ty(true)?;
                self.expect(Identifier)?;
                if self.at(Equals) {
                    self.equals_value_clause()?;
                }
                self.builder.finish_node();
                if !self.at(Comma) {
                    break;
                }
                self.bump();
            }
        }
        self.expect(CloseParen)?;
        self.builder.finish_node();
        Ok(())
    }

    fn method_body(&mut self) -> Result<()> {
        match self.current() {
            OpenBrace => self.block(),
            Semicolon => {
                self.bump();
                Ok(())
            }
            _ => Err(self.error("expected method body")),
        }
    }

    fn accessor_list(&mut self) -> Result<()> {
        self.builder.start_node(AccessorList);
        self.expect(OpenBrace)?;
        while !self.at(CloseBrace) && !self.at(EndOfFile) {
            self.builder.start_node(AccessorDeclaration);
            while self.current().is_modifier_keyword() {
                self.bump();
            }
            self.expect(Identifier)?;
            self.method_body()?;
            self.builder.finish_node();
        }
        self.expect(CloseBrace)?;
        self.builder.finish_node();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Names and types
    // ------------------------------------------------------------------

    /// Dotted name such as `System.Collections.Generic`
    fn name(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.simple_name(false)?;
        while self.at(Dot) && self.nth(1) == Identifier {
            self.builder.start_node_at(checkpoint, QualifiedName);
            self.bump();
            self.simple_name(false)?;
            self.builder.finish_node();
        }
        Ok(())
    }

    fn simple_name(&mut self, in_expression: bool) -> Result<()> {
        if !self.at(Identifier) {
            return Err(self.error("expected identifier"));
        }
        let generic = self.nth(1) == Less
            && self
                .scan_type_arguments(self.pos + 1)
                .is_some_and(|end| !in_expression || is_generic_follower(self.kind_at(end)));
        if generic {
            self.builder.start_node(GenericName);
            self.bump();
            self.builder.start_node(TypeArgumentList);
            self.bump();
            loop {
                self.ty(true)?;
                if !self.at(Comma) {
                    break;
                }
                self.bump();
            }
            self.expect(Greater)?;
            self.builder.finish_node();
            self.builder.finish_node();
        } else {
            self.builder.start_node(IdentifierName);
            self.bump();
            self.builder.finish_node();
        }
        Ok(())
    }

    fn ty(&mut self, allow_nullable: bool) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        if self.current().is_predefined_type_keyword() {
            self.builder.start_node(PredefinedType);
            self.bump();
            self.builder.finish_node();
        } else if self.at(Identifier) {
            self.name()?;
        } else {
            return Err(self.error("expected type"));
        }

        if allow_nullable && self.at(Question) {
            self.builder.start_node_at(checkpoint, NullableType);
            self.bump();
            self.builder.finish_node();
        }

        if self.at_rank_specifier() {
            self.builder.start_node_at(checkpoint, ArrayType);
            while self.at_rank_specifier() {
                self.builder.start_node(ArrayRankSpecifier);
                self.bump();
                while self.at(Comma) {
                    self.bump();
                }
                self.expect(CloseBracket)?;
                self.builder.finish_node();
            }
            self.builder.finish_node();
        }
        Ok(())
    }

    fn at_rank_specifier(&self) -> bool {
        self.at(OpenBracket) && matches!(self.nth(1), CloseBracket | Comma)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn block(&mut self) -> Result<()> {
        self.builder.start_node(Block);
        self.expect(OpenBrace)?;
        while !self.at(CloseBrace) && !self.at(EndOfFile) {
            self.statement()?;
        }
        self.expect(CloseBrace)?;
        self.builder.finish_node();
        Ok(())
    }

    fn statement(&mut self) -> Result<()> {
        match self.current() {
            OpenBrace => self.block(),
            Semicolon => self.keyword_statement(EmptyStatement, false),
            ReturnKw => self.keyword_statement(ReturnStatement, true),
            ThrowKw => self.keyword_statement(ThrowStatement, true),
            BreakKw => self.keyword_statement(BreakStatement, false),
            ContinueKw => self.keyword_statement(ContinueStatement, false),
            IfKw => self.if_statement(),
            WhileKw => {
                self.builder.start_node(WhileStatement);
                self.bump();
                self.expect(OpenParen)?;
                self.expression()?;
                self.expect(CloseParen)?;
                self.statement()?;
                self.builder.finish_node();
                Ok(())
            }
            SwitchKw => self.switch_statement(),
            _ if self.is_local_declaration() => {
                self.builder.start_node(LocalDeclarationStatement);
                if self.at(ConstKw) {
                    self.bump();
                }
                self.builder.start_node(VariableDeclaration);
                self.ty(true)?;
                self.variable_declarator()?;
                while self.at(Comma) {
                    self.bump();
                    self.variable_declarator()?;
                }
                self.builder.finish_node();
                self.expect(Semicolon)?;
                self.builder.finish_node();
                Ok(())
            }
            _ => {
                self.builder.start_node(ExpressionStatement);
                self.expression()?;
                self.expect(Semicolon)?;
                self.builder.finish_node();
                Ok(())
            }
        }
    }

    /// `keyword [expression] ;` and the bare `;`
    fn keyword_statement(&mut self, kind: SyntaxKind, has_expression: bool) -> Result<()> {
        self.builder.start_node(kind);
        self.bump();
        if kind != EmptyStatement {
            if has_expression && !self.at(Semicolon) {
                self.expression()?;
            }
            self.expect(Semicolon)?;
        }
        self.builder.finish_node();
        Ok(())
    }

    fn if_statement(&mut self) -> Result<()> {
        self.builder.start_node(IfStatement);
        self.bump();
        self.expect(OpenParen)?;
        self.expression()?;
        self.expect(CloseParen)?;
        self.statement()?;
        if self.at(ElseKw) {
            self.builder.start_node(ElseClause);
            self.bump();
            self.statement()?;
            self.builder.finish_node();
        }
        self.builder.finish_node();
        Ok(())
    }

    fn switch_statement(&mut self) -> Result<()> {
        self.builder.start_node(SwitchStatement);
        self.bump();
        self.expect(OpenParen)?;
        self.expression()?;
        self.expect(CloseParen)?;
        self.expect(OpenBrace)?;
        while self.at_switch_label() {
            self.builder.start_node(SwitchSection);
            while self.at_switch_label() {
                if self.at(CaseKw) {
                    self.builder.start_node(CaseSwitchLabel);
                    self.bump();
                    self.expression()?;
                } else {
                    self.builder.start_node(DefaultSwitchLabel);
                    self.bump();
                }
                self.expect(Colon)?;
                self.builder.finish_node();
            }
            while !self.at_switch_label() && !self.at(CloseBrace) && !self.at(EndOfFile) {
                self.statement()?;
            }
            self.builder.finish_node();
        }
        self.expect(CloseBrace)?;
        self.builder.finish_node();
        Ok(())
    }

    fn at_switch_label(&self) -> bool {
        self.at(CaseKw) || (self.at(DefaultKw) && self.nth(1) == Colon)
    }

    fn variable_declarator(&mut self) -> Result<()> {
        self.builder.start_node(VariableDeclarator);
        self.expect(Identifier)?;
        if self.at(Equals) {
            self.equals_value_clause()?;
        }
        self.builder.finish_node();
        Ok(())
    }

    fn equals_value_clause(&mut self) -> Result<()> {
        self.builder.start_node(EqualsValueClause);
        self.bump();
        self.expression()?;
        self.builder.finish_node();
        Ok(())
    }

    fn is_local_declaration(&self) -> bool {
        if self.at(ConstKw) {
            return true;
        }
        let Some(end) = self.scan_type(self.pos) else {
            return false;
        };
        self.kind_at(end) == Identifier && matches!(self.kind_at(end + 1), Equals | Semicolon | Comma)
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expression(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.conditional_expression()?;
        let (operator, width) = self.peek_operator();
        if let Some(kind) = SyntaxKind::assignment_expression_for(operator) {
            self.builder.start_node_at(checkpoint, kind);
            self.bump_operator(operator, width);
            self.expression()?;
            self.builder.finish_node();
        }
        Ok(())
    }

    fn conditional_expression(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.coalesce_expression()?;
        if self.at(Question) {
            self.builder.start_node_at(checkpoint, ConditionalExpression);
            self.bump();
            self.expression()?;
            self.expect(Colon)?;
            self.expression()?;
            self.builder.finish_node();
        }
        Ok(())
    }

    fn coalesce_expression(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.binary_expression(1)?;
        if self.at(QuestionQuestion) {
            self.builder.start_node_at(checkpoint, CoalesceExpression);
            self.bump();
            self.coalesce_expression()?;
            self.builder.finish_node();
        }
        Ok(())
    }

    fn binary_expression(&mut self, min_precedence: u8) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.unary_expression()?;
        loop {
            let (operator, width) = self.peek_operator();
            let Some(precedence) = binary_precedence(operator) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            let Some(kind) = SyntaxKind::binary_expression_for(operator) else {
                break;
            };
            self.builder.start_node_at(checkpoint, kind);
            self.bump_operator(operator, width);
            if matches!(operator, IsKw | AsKw) {
                self.ty(false)?;
            } else {
                self.binary_expression(precedence + 1)?;
            }
            self.builder.finish_node();
        }
        Ok(())
    }

    fn unary_expression(&mut self) -> Result<()> {
        if let Some(kind) = SyntaxKind::prefix_unary_expression_for(self.current()) {
            self.builder.start_node(kind);
            self.bump();
            self.unary_expression()?;
            self.builder.finish_node();
            return Ok(());
        }
        if self.at(OpenParen) && self.is_cast() {
            self.builder.start_node(CastExpression);
            self.bump();
            self.ty(true)?;
            self.expect(CloseParen)?;
            self.unary_expression()?;
            self.builder.finish_node();
            return Ok(());
        }
        self.postfix_expression()
    }

    fn postfix_expression(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.primary_expression()?;
        loop {
            match self.current() {
                Dot => {
                    self.builder.start_node_at(checkpoint, SimpleMemberAccessExpression);
                    self.bump();
                    self.simple_name(true)?;
                }
                OpenParen => {
                    self.builder.start_node_at(checkpoint, InvocationExpression);
                    self.argument_list()?;
                }
                OpenBracket => {
                    self.builder.start_node_at(checkpoint, ElementAccessExpression);
                    self.bracketed_argument_list()?;
                }
                PlusPlus => {
                    self.builder.start_node_at(checkpoint, PostIncrementExpression);
                    self.bump();
                }
                MinusMinus => {
                    self.builder.start_node_at(checkpoint, PostDecrementExpression);
                    self.bump();
                }
                _ => break,
            }
            self.builder.finish_node();
        }
        Ok(())
    }

    fn primary_expression(&mut self) -> Result<()> {
        let literal = match self.current() {
            NumericLiteral => Some(NumericLiteralExpression),
            StringLiteral => Some(StringLiteralExpression),
            CharacterLiteral => Some(CharacterLiteralExpression),
            TrueKw => Some(TrueLiteralExpression),
            FalseKw => Some(FalseLiteralExpression),
            NullKw => Some(NullLiteralExpression),
            ThisKw => Some(ThisExpression),
            DefaultKw if self.nth(1) != OpenParen => Some(DefaultLiteralExpression),
            _ => None,
        };
        if let Some(kind) = literal {
            self.builder.start_node(kind);
            self.bump();
            self.builder.finish_node();
            return Ok(());
        }

        match self.current() {
            OpenParen => {
                self.builder.start_node(ParenthesizedExpression);
                self.bump();
                self.expression()?;
                self.expect(CloseParen)?;
                self.builder.finish_node();
            }
            NewKw => self.creation_expression()?,
            TypeofKw | DefaultKw => {
                let kind = if self.at(TypeofKw) {
                    TypeOfExpression
                } else {
                    DefaultExpression
                };
                self.builder.start_node(kind);
                self.bump();
                self.expect(OpenParen)?;
                self.ty(true)?;
                self.expect(CloseParen)?;
                self.builder.finish_node();
            }
            CheckedKw | UncheckedKw => {
                self.builder.start_node(CheckedExpression);
                self.bump();
                self.expect(OpenParen)?;
                self.expression()?;
                self.expect(CloseParen)?;
                self.builder.finish_node();
            }
            kind if kind.is_predefined_type_keyword() => {
                self.builder.start_node(PredefinedType);
                self.bump();
                self.builder.finish_node();
            }
            Identifier => self.simple_name(true)?,
            _ => return Err(self.error("expected expression")),
        }
        Ok(())
    }

    fn creation_expression(&mut self) -> Result<()> {
        let checkpoint = self.builder.checkpoint();
        self.bump();
        let type_checkpoint = self.builder.checkpoint();
        if self.current().is_predefined_type_keyword() {
            self.builder.start_node(PredefinedType);
            self.bump();
            self.builder.finish_node();
        } else {
            self.name()?;
        }

        if self.at(OpenBracket) {
            self.builder.start_node_at(type_checkpoint, ArrayType);
            while self.at(OpenBracket) {
                self.builder.start_node(ArrayRankSpecifier);
                self.bump();
                while !self.at(CloseBracket) && !self.at(EndOfFile) {
                    if self.at(Comma) {
                        self.bump();
                    } else {
                        self.expression()?;
                    }
                }
                self.expect(CloseBracket)?;
                self.builder.finish_node();
            }
            self.builder.finish_node();
            self.builder.start_node_at(checkpoint, ArrayCreationExpression);
        } else {
            self.builder.start_node_at(checkpoint, ObjectCreationExpression);
            if self.at(OpenParen) {
                self.argument_list()?;
            }
        }
        self.builder.finish_node();
        Ok(())
    }

    fn argument_list(&mut self) -> Result<()> {
        self.builder.start_node(ArgumentList);
        self.expect(OpenParen)?;
        self.arguments(CloseParen)?;
        self.expect(CloseParen)?;
        self.builder.finish_node();
        Ok(())
    }

    fn bracketed_argument_list(&mut self) -> Result<()> {
        self.builder.start_node(BracketedArgumentList);
        self.expect(OpenBracket)?;
        self.arguments(CloseBracket)?;
        self.expect(CloseBracket)?;
        self.builder.finish_node();
        Ok(())
    }

    fn arguments(&mut self, close: SyntaxKind) -> Result<()> {
        if self.at(close) {
            return Ok(());
        }
        loop {
            self.builder.start_node(Argument);
            self.expression()?;
            self.builder.finish_node();
            if !self.at(Comma) {
                return Ok(());
            }
            self.bump();
        }
    }

    /// `(T)x` versus `(a) + b`: a parenthesized type followed by something
    /// that can start an operand is a cast
    fn is_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if self.kind_at(end) != CloseParen {
            return false;
        }
        let next = self.kind_at(end + 1);
        let predefined = self.kind_at(self.pos + 1).is_predefined_type_keyword();
        can_follow_cast(next)
            || (predefined && matches!(next, Minus | Plus | PlusPlus | MinusMinus))
    }

    // ------------------------------------------------------------------
    // Lookahead
    // ------------------------------------------------------------------

    fn scan_type(&self, pos: usize) -> Option<usize> {
        let mut pos = pos;
        let kind = self.kind_at(pos);
        if kind.is_predefined_type_keyword() {
            pos += 1;
        } else if kind == Identifier {
            pos = self.scan_simple_name(pos)?;
            while self.kind_at(pos) == Dot && self.kind_at(pos + 1) == Identifier {
                pos = self.scan_simple_name(pos + 1)?;
            }
        } else {
            return None;
        }
        if self.kind_at(pos) == Question {
            pos += 1;
        }
        while self.kind_at(pos) == OpenBracket {
            let mut close = pos + 1;
            while self.kind_at(close) == Comma {
                close += 1;
            }
            if self.kind_at(close) != CloseBracket {
                break;
            }
            pos = close + 1;
        }
        Some(pos)
    }

    fn scan_simple_name(&self, pos: usize) -> Option<usize> {
        if self.kind_at(pos) != Identifier {
            return None;
        }
        if self.kind_at(pos + 1) == Less {
            if let Some(end) = self.scan_type_arguments(pos + 1) {
                return Some(end);
            }
        }
        Some(pos + 1)
    }

    /// Position after a `<...>` list starting at `pos`
    fn scan_type_arguments(&self, pos: usize) -> Option<usize> {
        let mut pos = pos + 1;
        loop {
            pos = self.scan_type(pos)?;
            match self.kind_at(pos) {
                Comma => pos += 1,
                Greater => return Some(pos + 1),
                _ => return None,
            }
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn kind_at(&self, pos: usize) -> SyntaxKind {
        let last = self.tokens.len() - 1;
        self.tokens[pos.min(last)].kind
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    fn bump(&mut self) {
        let token = &mut self.tokens[self.pos];
        let green = GreenToken::with_trivia(
            token.kind,
            std::mem::take(&mut token.text),
            std::mem::take(&mut token.leading),
            std::mem::take(&mut token.trailing),
        );
        self.builder.push_token(green);
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> Result<()> {
        if self.at(kind) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", kind, self.current())))
        }
    }

    /// Operator at the cursor, gluing `>` `>` and `>` `>=` written without trivia
    fn peek_operator(&self) -> (SyntaxKind, usize) {
        let current = self.current();
        if current == Greater && self.adjacent(1) {
            match self.nth(1) {
                Greater => return (GreaterGreater, 2),
                GreaterEquals => return (GreaterGreaterEquals, 2),
                _ => {}
            }
        }
        (current, 1)
    }

    fn adjacent(&self, n: usize) -> bool {
        let index = self.pos + n;
        index < self.tokens.len()
            && self.tokens[index - 1].trailing.is_empty()
            && self.tokens[index].leading.is_empty()
    }

    fn bump_operator(&mut self, kind: SyntaxKind, width: usize) {
        if width == 1 {
            self.bump();
            return;
        }
        let first = &mut self.tokens[self.pos];
        let leading = std::mem::take(&mut first.leading);
        let mut text = std::mem::take(&mut first.text);
        let last = &mut self.tokens[self.pos + width - 1];
        let trailing = std::mem::take(&mut last.trailing);
        for token in &self.tokens[self.pos + 1..self.pos + width] {
            text.push_str(&token.text);
        }
        self.builder
            .push_token(GreenToken::with_trivia(kind, text, leading, trailing));
        self.pos += width;
    }

    fn error(&self, message: impl Into<String>) -> RefitError {
        RefitError::parse_error(message, self.tokens[self.pos].offset)
    }
}

/// Binding power of binary operators, higher binds tighter
fn binary_precedence(operator: SyntaxKind) -> Option<u8> {
    let precedence = match operator {
        BarBar => 1,
        AmpersandAmpersand => 2,
        Bar => 3,
        Caret => 4,
        Ampersand => 5,
        EqualsEquals | ExclamationEquals => 6,
        Less | Greater | LessEquals | GreaterEquals | IsKw | AsKw => 7,
        LessLess | GreaterGreater => 8,
        Plus | Minus => 9,
        Star | Slash | Percent => 10,
        _ => return None,
    };
    Some(precedence)
}

fn can_follow_cast(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        Identifier
            | NumericLiteral
            | StringLiteral
            | CharacterLiteral
            | OpenParen
            | Exclamation
            | Tilde
            | ThisKw
            | NewKw
            | TypeofKw
            | DefaultKw
            | CheckedKw
            | UncheckedKw
            | TrueKw
            | FalseKw
            | NullKw
    ) || kind.is_predefined_type_keyword()
}

/// Tokens after which `a<b>` is read as a generic name in an expression
fn is_generic_follower(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        OpenParen | CloseParen | Dot | Semicolon | Comma | CloseBracket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxNode;
    use biome_text_size::TextSize;

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> SyntaxNode {
        tree.root()
            .descendants()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind:?} in tree"))
    }

    fn expression_tree(expr: &str) -> SyntaxTree {
        parse(&format!("class C {{ void M() {{ var r = {expr}; }} }}")).unwrap()
    }

    fn initializer(tree: &SyntaxTree) -> SyntaxNode {
        find(tree, EqualsValueClause).child_nodes().next().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let source = r#"using System;
using System.Collections.Generic;

namespace Demo
{
    /// <summary>Doc</summary>
    [Flags]
    public enum Options : byte
    {
        None = 0,
        A = 1 << 0, // first
        B = 1 << 1,
    }

    public class Service
    {
        private const int Limit = 10;
        private readonly List<string> _items = new List<string>();

        public Service(int x) { }

        public int Count { get; private set; }

        public string Describe(object x, Dictionary<string, List<int>> map)
        {
            // leading comment
            if (x is int)
            {
                return "Int32";
            }
            else if (x is long)
                return "Int64";
            else
            {
                return (string)x ?? "";
            }
        }

        int Shift(int a) { a >>= 2; return a >> 1; }

        void Loop(int[] values)
        {
            while (values.Length > 0 && !done) { break; }
            switch (values[0])
            {
                case 1:
                case 2:
                    Console.WriteLine(typeof(int));
                    break;
                default:
                    throw new InvalidOperationException();
            }
        }
    }
}
"#;
        let tree = parse(source).unwrap();
        assert_eq!(tree.text(), source);
        assert_eq!(tree.root().full_span().len(), TextSize::of(source));
    }

    #[test]
    fn test_if_else_chain_shape() {
        let tree = parse("class C { void M() { if (a) x(); else if (b) y(); else z(); } }")
            .unwrap();
        let outer = find(&tree, IfStatement);
        let else_clause = outer.child_of_kind(ElseClause).unwrap();
        let inner = else_clause.child_nodes().next().unwrap();
        assert_eq!(inner.kind(), IfStatement);
        let last_else = inner.child_of_kind(ElseClause).unwrap();
        assert_eq!(
            last_else.child_nodes().next().unwrap().kind(),
            ExpressionStatement
        );
    }

    #[test]
    fn test_binary_precedence() {
        let tree = expression_tree("a || b && c == d + e * f");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), LogicalOrExpression);
        let right = expr.child_nodes().nth(1).unwrap();
        assert_eq!(right.kind(), LogicalAndExpression);
        let eq = right.child_nodes().nth(1).unwrap();
        assert_eq!(eq.kind(), EqualsExpression);
        let add = eq.child_nodes().nth(1).unwrap();
        assert_eq!(add.kind(), AddExpression);
        assert_eq!(add.child_nodes().nth(1).unwrap().kind(), MultiplyExpression);
    }

    #[test]
    fn test_left_associativity() {
        let tree = expression_tree("a - b - c");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), SubtractExpression);
        assert_eq!(expr.child_nodes().next().unwrap().kind(), SubtractExpression);
    }

    #[test]
    fn test_postfix_chain() {
        let tree = expression_tree("list.Where(x).First()[0]");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), ElementAccessExpression);
        let invocation = expr.child_nodes().next().unwrap();
        assert_eq!(invocation.kind(), InvocationExpression);
        let access = invocation.child_nodes().next().unwrap();
        assert_eq!(access.kind(), SimpleMemberAccessExpression);
        assert_eq!(access.trimmed_text(), "list.Where(x).First");
    }

    #[test]
    fn test_cast_versus_parenthesized() {
        let cast = expression_tree("(int)x");
        assert_eq!(initializer(&cast).kind(), CastExpression);

        let negative = expression_tree("(int)-x");
        assert_eq!(initializer(&negative).kind(), CastExpression);

        let sum = expression_tree("(a) + b");
        assert_eq!(initializer(&sum).kind(), AddExpression);

        let member = expression_tree("(a).b");
        assert_eq!(initializer(&member).kind(), SimpleMemberAccessExpression);
    }

    #[test]
    fn test_right_shift_glued() {
        let tree = expression_tree("a >> 1");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), RightShiftExpression);
        let operator = expr.child_tokens().next().unwrap();
        assert_eq!(operator.kind(), GreaterGreater);
        assert_eq!(operator.token_text(), ">>");
    }

    #[test]
    fn test_generic_types() {
        let tree =
            parse("class C { Dictionary<string, List<int>> map; int[] xs; int? n; }").unwrap();
        let generic = find(&tree, GenericName);
        assert_eq!(generic.trimmed_text(), "Dictionary<string, List<int>>");
        assert_eq!(find(&tree, ArrayType).trimmed_text(), "int[]");
        assert_eq!(find(&tree, NullableType).trimmed_text(), "int?");
    }

    #[test]
    fn test_local_declaration_versus_expression() {
        let tree = parse("class C { void M() { var a = 1; a = 2; Foo(); int b, c; } }").unwrap();
        let block = find(&tree, Block);
        let kinds: Vec<_> = block.child_nodes().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                LocalDeclarationStatement,
                ExpressionStatement,
                ExpressionStatement,
                LocalDeclarationStatement,
            ]
        );
    }

    #[test]
    fn test_conditional_and_assignment() {
        let tree = expression_tree("a ? b : c ?? d");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), ConditionalExpression);

        let tree = parse("class C { void M() { x += y = 1; } }").unwrap();
        let assignment = find(&tree, AddAssignmentExpression);
        assert_eq!(
            assignment.child_nodes().nth(1).unwrap().kind(),
            SimpleAssignmentExpression
        );
    }

    #[test]
    fn test_is_and_as_take_types() {
        let tree = expression_tree("x is int && y as string != null");
        let expr = initializer(&tree);
        assert_eq!(expr.kind(), LogicalAndExpression);
        let left = expr.child_nodes().next().unwrap();
        assert_eq!(left.kind(), IsExpression);
        assert_eq!(left.child_nodes().nth(1).unwrap().kind(), PredefinedType);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("class { }").is_err());
        assert!(parse("class C { void M() { return } }").is_err());
        let err = parse("class C { int }").unwrap_err();
        assert!(matches!(err, RefitError::Parse { .. }));
    }
}
