//! Refit Core
//!
//! Building blocks of the refit rewrite engine: lossless immutable syntax
//! trees with trivia, span predicates over them, a path-copying tree
//! editor, the semantic-model boundary rules query through, configuration
//! and diagnostics.

pub mod config;
pub mod diagnostics;
pub mod edit;
pub mod error;
pub mod result;
pub mod semantic;
pub mod span;
pub mod syntax;

pub use config::{AllRules, ConfigLoader, RefitConfig, RuleFilter, RulesConfiguration};
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticSink, Location, Severity};
pub use edit::{TextEdit, apply_edits};
pub use error::{ErrorKind, RefitError};
pub use result::{Result, ResultExt};
pub use semantic::{
    ConstantValue, FixtureModel, FixtureProvider, IntegralType, MethodInfo, SemanticCache,
    SemanticModel, SemanticModelProvider, Symbol, SymbolId, SymbolKind, TypeInfo, TypeKind,
};
pub use span::SelectionExt;
pub use syntax::{
    NodeId, SnapshotId, SyntaxKind, SyntaxNode, SyntaxTree, TreeEditor, Trivia, TriviaKind, parse,
};

pub use biome_text_size::{TextRange, TextSize};
pub use tokio_util::sync::CancellationToken;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    init_tracing_with("refit=info", false);
}

/// Initialize tracing with a default filter, optionally as JSON lines
///
/// `RUST_LOG` overrides `default_filter` when set.
pub fn init_tracing_with(default_filter: &str, json: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
