//! Configuration for refit
//!
//! Configuration is optional. When no explicit path is given the loader
//! searches upward from the working directory for `.refitrc.json`,
//! `.refitrc.toml` or `refit.json`; with none found every rule is enabled.
//!
//! ```toml
//! [rules]
//! all = true
//! disabled = ["remove-comment"]
//!
//! [rules.enabled]
//! "split-if-else" = true
//!
//! [formatting]
//! newline = "lf"
//! ```

mod loader;
mod refit_config;

pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
pub use refit_config::{
    AllRules, FormattingConfiguration, NewlineStyle, RefitConfig, RuleFilter, RulesConfiguration,
};
