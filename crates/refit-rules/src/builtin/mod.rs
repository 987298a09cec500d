//! Built-in rules
//!
//! Each module holds one rule: its id, metadata, matcher, builder and
//! unit tests. [`BuiltinRules`] lists them in registration order, which
//! is also the order their offers appear in at a given node.

pub mod generate_enum_member;
pub mod generate_enum_values;
pub mod merge_local_declaration_with_return;
pub mod negate_is_expression;
pub mod negate_operator;
pub mod remove_comment;
pub mod remove_statements_from_switch_sections;
pub mod replace_any_with_count_or_length;
pub mod replace_method_with_element_access;
pub mod sort_enum_members;
pub mod sort_member_declarations;
pub mod split_if_else;
pub mod swap_if_else;

pub use generate_enum_member::GenerateEnumMember;
pub use generate_enum_values::GenerateEnumValues;
pub use merge_local_declaration_with_return::MergeLocalDeclarationWithReturn;
pub use negate_is_expression::NegateIsExpression;
pub use negate_operator::NegateOperator;
pub use remove_comment::RemoveComment;
pub use remove_statements_from_switch_sections::RemoveStatementsFromSwitchSections;
pub use replace_any_with_count_or_length::ReplaceAnyWithCountOrLength;
pub use replace_method_with_element_access::ReplaceMethodWithElementAccess;
pub use sort_enum_members::SortEnumMembers;
pub use sort_member_declarations::SortMemberDeclarations;
pub use split_if_else::SplitIfElse;
pub use swap_if_else::SwapIfElseStatements;

use crate::engine::RuleRegistry;
use crate::rule::{DynRule, boxed};
use refit_core::Result;
use std::sync::Arc;

/// The rules shipped with refit
pub struct BuiltinRules;

impl BuiltinRules {
    pub fn all() -> Vec<Arc<dyn DynRule>> {
        vec![
            boxed(MergeLocalDeclarationWithReturn),
            boxed(ReplaceAnyWithCountOrLength),
            boxed(SplitIfElse),
            boxed(SwapIfElseStatements),
            boxed(NegateOperator),
            boxed(NegateIsExpression),
            boxed(ReplaceMethodWithElementAccess),
            boxed(SortMemberDeclarations),
            boxed(SortEnumMembers),
            boxed(GenerateEnumValues),
            boxed(GenerateEnumMember),
            boxed(RemoveStatementsFromSwitchSections),
            boxed(RemoveComment),
        ]
    }

    /// Rules that only offer rewrites
    pub fn refactorings() -> Vec<Arc<dyn DynRule>> {
        Self::all()
            .into_iter()
            .filter(|rule| !rule.metadata().analyzer)
            .collect()
    }

    /// Rules that also report diagnostics
    pub fn analyzers() -> Vec<Arc<dyn DynRule>> {
        Self::all()
            .into_iter()
            .filter(|rule| rule.metadata().analyzer)
            .collect()
    }

    pub fn registry() -> Result<RuleRegistry> {
        RuleRegistry::with_rules(Self::all())
    }
}
