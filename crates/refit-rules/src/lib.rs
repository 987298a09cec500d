//! Refit Rules
//!
//! The rule abstraction, the dispatcher that runs rules against a document,
//! the document transaction applier, and the built-in rule set.
//!
//! A rule is a matcher plus a builder. The dispatcher offers each syntax
//! node around a selection to the enabled rules registered for its kind;
//! a chosen offer is then built against a [`refit_core::TreeEditor`] and
//! applied to produce a new tree snapshot.

pub mod apply;
pub mod builders;
pub mod builtin;
pub mod context;
pub mod engine;
pub mod matchers;
pub mod rule;

// Re-export commonly used types
pub use apply::{RewriteResult, apply};
pub use builtin::BuiltinRules;
pub use context::MatchContext;
pub use engine::registry::{global, install};
pub use engine::{CodeAction, CodeActionRequest, Dispatcher, RuleRegistry};
pub use rule::{Candidate, DynRule, Offer, Rule, RuleCategory, RuleMetadata, boxed};

/// Build the built-in registry and install it process-wide
///
/// Returns the installed registry. Fails if a registry is already
/// installed.
pub fn install_builtin_rules() -> refit_core::Result<std::sync::Arc<RuleRegistry>> {
    let registry = BuiltinRules::registry()?;
    tracing::debug!(rules = registry.len(), "Installing built-in rules");
    install(registry)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
