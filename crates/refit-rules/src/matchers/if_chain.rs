//! Navigation over `if` / `else if` / `else` chains
//!
//! A chain is anchored at its topmost `if`: the one that is not itself the
//! body of an `else` clause. Walking [`next_if`] from there visits every
//! `if` of the chain, and [`chain`] ends with the final `else`, if any.

use refit_core::SyntaxKind;
use refit_core::syntax::ast::{AstNode, ElseClause, IfStatement};

/// One link of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainLink {
    If(IfStatement),
    /// The final `else`, whose body is not an `if`
    Else(ElseClause),
}

impl ChainLink {
    pub fn syntax(&self) -> &refit_core::SyntaxNode {
        match self {
            ChainLink::If(if_statement) => if_statement.syntax(),
            ChainLink::Else(else_clause) => else_clause.syntax(),
        }
    }
}

/// The `if` whose `else` body is `if_statement`
pub fn previous_if(if_statement: &IfStatement) -> Option<IfStatement> {
    let parent = if_statement.syntax().parent()?;
    if parent.kind() != SyntaxKind::ElseClause {
        return None;
    }
    IfStatement::cast(parent.parent()?)
}

/// The `if` in this statement's `else` clause
pub fn next_if(if_statement: &IfStatement) -> Option<IfStatement> {
    IfStatement::cast(if_statement.else_clause()?.statement()?)
}

pub fn is_topmost_if(if_statement: &IfStatement) -> bool {
    previous_if(if_statement).is_none()
}

pub fn topmost_if(if_statement: &IfStatement) -> IfStatement {
    let mut current = if_statement.clone();
    while let Some(previous) = previous_if(&current) {
        current = previous;
    }
    current
}

/// The topmost `if` of the chain an `else` clause belongs to
pub fn topmost_if_of_else(else_clause: &ElseClause) -> Option<IfStatement> {
    let owner = IfStatement::cast(else_clause.syntax().parent()?)?;
    Some(topmost_if(&owner))
}

/// Links from `if_statement` downwards
pub fn chain(if_statement: &IfStatement) -> Vec<ChainLink> {
    let mut links = Vec::new();
    let mut current = Some(if_statement.clone());
    while let Some(if_statement) = current {
        current = next_if(&if_statement);
        let final_else = if current.is_none() {
            if_statement.else_clause()
        } else {
            None
        };
        links.push(ChainLink::If(if_statement));
        if let Some(else_clause) = final_else {
            links.push(ChainLink::Else(else_clause));
        }
    }
    links
}

pub fn is_part_of_chain(if_statement: &IfStatement) -> bool {
    if_statement.else_clause().is_some() || previous_if(if_statement).is_some()
}

pub fn contains_else_if(if_statement: &IfStatement) -> bool {
    next_if(if_statement).is_some()
}

pub fn ends_with_else(if_statement: &IfStatement) -> bool {
    matches!(chain(if_statement).last(), Some(ChainLink::Else(_)))
}

/// Whether the body of `else_clause` is not another `if`
pub fn is_end_of_chain(else_clause: &ElseClause) -> bool {
    else_clause
        .statement()
        .is_none_or(|statement| statement.kind() != SyntaxKind::IfStatement)
}
