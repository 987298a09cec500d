//! Pattern matchers shared by the built-in rules
//!
//! Matchers are pure functions over syntax. Rules combine them with span
//! predicates from `refit_core::span` and, when the syntactic filter has
//! passed, with facts from the semantic model.

pub mod flags;
pub mod if_chain;
pub mod selection;

pub use flags::{FlagValueMode, FlagsEnum, next_flag_value};
pub use if_chain::{ChainLink, chain, is_topmost_if, next_if, previous_if, topmost_if};
pub use selection::SelectedNodes;
