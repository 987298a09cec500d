//! Rewrite builders
//!
//! Builders allocate new green elements in a [`refit_core::TreeEditor`] and
//! hand back node ids; nothing is attached to a tree until the applier runs.

pub mod factory;
pub mod negation;
pub mod trivia;

pub use negation::{can_negate, logically_negate, precedence};
