//! Rule registry
//!
//! Rules are kept in registration order, which is also the order the
//! dispatcher consults them in. A process-wide registry can be installed
//! once at startup; after that it is read-only.

use crate::rule::{DynRule, RuleMetadata};
use once_cell::sync::OnceCell;
use refit_core::{RefitError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static GLOBAL: OnceCell<Arc<RuleRegistry>> = OnceCell::new();

/// Ordered set of rules keyed by id
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn DynRule>>,
    index: HashMap<String, usize>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate ids
    pub fn with_rules(rules: impl IntoIterator<Item = Arc<dyn DynRule>>) -> Result<Self> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register(rule)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, rule: Arc<dyn DynRule>) -> Result<()> {
        let id = rule.metadata().id.clone();
        if self.index.contains_key(&id) {
            return Err(RefitError::rule_error(id, "rule is already registered"));
        }
        tracing::trace!(rule = %id, "Registered rule");
        self.index.insert(id, self.rules.len());
        self.rules.push(rule);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn DynRule>> {
        self.index.get(id).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Rules in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DynRule>> {
        self.rules.iter()
    }

    pub fn metadata(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.rules.iter().map(|rule| rule.metadata())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| &rule.metadata().id))
            .finish()
    }
}

/// Install the process-wide registry
///
/// Fails if one is already installed.
pub fn install(registry: RuleRegistry) -> Result<Arc<RuleRegistry>> {
    let registry = Arc::new(registry);
    GLOBAL
        .set(Arc::clone(&registry))
        .map_err(|_| RefitError::internal_error("a rule registry is already installed"))?;
    tracing::debug!(rules = registry.len(), "Installed rule registry");
    Ok(registry)
}

/// The installed registry, if any
pub fn global() -> Option<Arc<RuleRegistry>> {
    GLOBAL.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinRules;
    use crate::builtin::split_if_else::{self, SplitIfElse};
    use crate::rule::boxed;

    #[test]
    fn test_registration_order_is_kept() {
        let registry = BuiltinRules::registry().unwrap();
        let ids: Vec<_> = registry.iter().map(|rule| rule.metadata().id.clone()).collect();
        let expected: Vec<_> = BuiltinRules::all()
            .iter()
            .map(|rule| rule.metadata().id.clone())
            .collect();
        assert_eq!(ids, expected);
        assert!(registry.get(split_if_else::RULE_ID).is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut registry = RuleRegistry::new();
        registry.register(boxed(SplitIfElse)).unwrap();
        assert!(registry.register(boxed(SplitIfElse)).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_install_is_write_once() {
        let installed = install(BuiltinRules::registry().unwrap()).unwrap();
        assert_eq!(global().map(|r| r.len()), Some(installed.len()));
        assert!(install(RuleRegistry::new()).is_err());
    }
}
