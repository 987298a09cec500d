//! Error types for tree construction, rule evaluation and rewriting

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for refit operations
#[derive(Debug, Error)]
pub enum RefitError {
    /// Source text could not be lexed or parsed
    #[error("Parse error: {message} at offset {offset}")]
    Parse { message: String, offset: usize },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Rule registration or evaluation errors
    #[error("Rule error in '{rule_id}': {message}")]
    Rule { rule_id: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The semantic model could not be produced
    #[error("Semantic error: {message}")]
    Semantic { message: String },

    /// The request was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// An internal invariant did not hold
    #[error("Contract violation: {message}")]
    ContractViolation { message: String },

    /// A rewrite referenced nodes from a different tree snapshot
    #[error("Stale tree: expected snapshot {expected}, found {found}")]
    StaleTree { expected: u64, found: u64 },

    /// A rewrite could not be applied to the tree
    #[error("Invalid edit: {message}")]
    InvalidEdit { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Config,
    Rule,
    Io,
    Semantic,
    Cancelled,
    ContractViolation,
    StaleTree,
    InvalidEdit,
    Internal,
}

impl RefitError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefitError::Parse { .. } => ErrorKind::Parse,
            RefitError::Config { .. } => ErrorKind::Config,
            RefitError::Rule { .. } => ErrorKind::Rule,
            RefitError::Io { .. } => ErrorKind::Io,
            RefitError::Semantic { .. } => ErrorKind::Semantic,
            RefitError::Cancelled => ErrorKind::Cancelled,
            RefitError::ContractViolation { .. } => ErrorKind::ContractViolation,
            RefitError::StaleTree { .. } => ErrorKind::StaleTree,
            RefitError::InvalidEdit { .. } => ErrorKind::InvalidEdit,
            RefitError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error only invalidates the current offer
    ///
    /// Recoverable errors drop a single code action or diagnostic; the
    /// remaining rules keep running.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Rule
                | ErrorKind::Semantic
                | ErrorKind::ContractViolation
                | ErrorKind::StaleTree
                | ErrorKind::InvalidEdit
        )
    }

    /// Check if this error is a cancellation rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RefitError::Cancelled)
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            message: message.into(),
            offset,
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a semantic error
    pub fn semantic_error(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }

    /// Create an invalid edit error
    pub fn invalid_edit(message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Report a broken invariant
    ///
    /// Panics in debug builds. Release builds get the error back so the
    /// caller can withdraw its offer instead of taking the host down.
    #[track_caller]
    pub fn contract_violation(message: impl Into<String>) -> Self {
        let message = message.into();
        debug_assert!(false, "contract violation: {message}");
        tracing::error!("Contract violation: {}", message);
        Self::ContractViolation { message }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for RefitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for RefitError {
    fn from(err: serde_json::Error) -> Self {
        Self::config_error(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for RefitError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_error(format!("TOML error: {err}"))
    }
}
