//! Configuration types for refit

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decides which rules may run
pub trait RuleFilter: Send + Sync {
    fn is_enabled(&self, rule_id: &str) -> bool;
}

/// Filter that enables every rule
#[derive(Debug, Clone, Copy, Default)]
pub struct AllRules;

impl RuleFilter for AllRules {
    fn is_enabled(&self, _rule_id: &str) -> bool {
        true
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefitConfig {
    /// Rule selection
    pub rules: Option<RulesConfiguration>,

    /// Formatting defaults for generated text
    pub formatting: Option<FormattingConfiguration>,
}

impl RefitConfig {
    /// Parse a JSON configuration document
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Parse a TOML configuration document
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn rules_config(&self) -> RulesConfiguration {
        self.rules.clone().unwrap_or_default()
    }

    pub fn formatting_config(&self) -> FormattingConfiguration {
        self.formatting.clone().unwrap_or_default()
    }

    /// Newline used when a document contains none
    pub fn newline(&self) -> &'static str {
        self.formatting
            .as_ref()
            .and_then(|f| f.newline)
            .unwrap_or_default()
            .as_str()
    }
}

/// Which rules are enabled
///
/// `all` sets the baseline (on when absent). Entries in `enabled` override
/// it per rule, and `disabled` always wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RulesConfiguration {
    /// Enable every rule not mentioned elsewhere
    pub all: Option<bool>,

    /// Per-rule switches
    pub enabled: Option<BTreeMap<String, bool>>,

    /// Rules that never run
    pub disabled: Option<Vec<String>>,
}

impl RuleFilter for RulesConfiguration {
    fn is_enabled(&self, rule_id: &str) -> bool {
        if self
            .disabled
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == rule_id))
        {
            return false;
        }
        self.enabled
            .as_ref()
            .and_then(|map| map.get(rule_id).copied())
            .unwrap_or(self.all.unwrap_or(true))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormattingConfiguration {
    pub newline: Option<NewlineStyle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineStyle {
    #[default]
    Lf,
    Crlf,
}

impl NewlineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::Crlf => "\r\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = RefitConfig::default();
        assert!(config.rules_config().is_enabled("split-if-else"));
        assert_eq!(config.newline(), "\n");
    }

    #[test]
    fn test_disabled_wins_over_enabled() {
        let rules: RulesConfiguration = serde_json::from_str(
            r#"{
                "all": false,
                "enabled": { "split-if-else": true, "remove-comment": true },
                "disabled": ["remove-comment"]
            }"#,
        )
        .unwrap();
        assert!(rules.is_enabled("split-if-else"));
        assert!(!rules.is_enabled("remove-comment"));
        assert!(!rules.is_enabled("negate-operator"));
    }

    #[test]
    fn test_toml_document() {
        let config = RefitConfig::from_toml(
            r#"
[rules]
disabled = ["sort-enum-members"]

[formatting]
newline = "crlf"
"#,
        )
        .unwrap();
        assert!(!config.rules_config().is_enabled("sort-enum-members"));
        assert!(config.rules_config().is_enabled("negate-operator"));
        assert_eq!(config.newline(), "\r\n");
    }

    #[test]
    fn test_newline_serialization() {
        let json = serde_json::to_string(&NewlineStyle::Crlf).unwrap();
        assert_eq!(json, "\"crlf\"");
    }
}
