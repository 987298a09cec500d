//! The rule abstraction
//!
//! A rule pairs a matcher with a builder. The matcher inspects one syntax
//! node (and, if it needs to, the semantic model) and returns zero or more
//! [`Candidate`]s, each carrying a title and a rule-specific payload. The
//! builder later turns a payload into a [`RewriteResult`] against a
//! [`TreeEditor`]. Analyzer rules additionally describe a [`Diagnostic`]
//! for each match.
//!
//! The dispatcher only ever sees rules through the object-safe
//! [`DynRule`], which erases the payload type by capturing it in the
//! returned [`Offer`]s.

use crate::apply::RewriteResult;
use crate::context::MatchContext;
use async_trait::async_trait;
use refit_core::{Diagnostic, Result, Severity, SyntaxKind, SyntaxNode, TreeEditor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rule categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Restructures code without changing behaviour
    Refactoring,
    /// Replaces code with a simpler equivalent
    Simplification,
    /// Replaces code with a cheaper equivalent
    Performance,
    /// Reorders or regenerates declarations
    Style,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuleCategory::Refactoring => "refactoring",
            RuleCategory::Simplification => "simplification",
            RuleCategory::Performance => "performance",
            RuleCategory::Style => "style",
        };
        f.write_str(label)
    }
}

/// Descriptive data of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Unique identifier, e.g. `split-if-else`
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub description: String,
    /// Severity of diagnostics, for analyzer rules
    pub severity: Severity,
    pub category: RuleCategory,
    /// Whether the rule reports diagnostics when analyzing a document
    pub analyzer: bool,
    pub tags: Vec<String>,
}

impl RuleMetadata {
    pub fn refactoring(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            severity: Severity::Hint,
            category: RuleCategory::Refactoring,
            analyzer: false,
            tags: Vec::new(),
        }
    }

    pub fn analyzer(id: &str, name: &str, description: &str, severity: Severity) -> Self {
        Self {
            severity,
            analyzer: true,
            ..Self::refactoring(id, name, description)
        }
    }

    pub fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// One rewrite a matcher found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<M> {
    pub title: String,
    /// Stable key identifying this kind of rewrite across documents
    pub equivalence_key: String,
    pub payload: M,
}

impl<M> Candidate<M> {
    pub fn new(title: impl Into<String>, equivalence_key: impl Into<String>, payload: M) -> Self {
        Self {
            title: title.into(),
            equivalence_key: equivalence_key.into(),
            payload,
        }
    }
}

/// A pattern-match-and-rewrite rule
#[async_trait]
pub trait Rule: Send + Sync + 'static {
    /// What the matcher hands to the builder
    type Match: Send + Sync + 'static;

    fn metadata(&self) -> &RuleMetadata;

    /// Node kinds the dispatcher offers this rule
    fn node_kinds(&self) -> &'static [SyntaxKind];

    /// Match `node`, returning no candidates when a precondition fails
    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<Self::Match>>>;

    /// Build the rewrite for a match
    ///
    /// `Ok(None)` means the match no longer applies to the editor's tree.
    fn build(&self, found: &Self::Match, editor: &mut TreeEditor) -> Result<Option<RewriteResult>>;

    /// Diagnostic reported for a match when analyzing
    fn diagnostic(&self, _node: &SyntaxNode, _found: &Self::Match) -> Option<Diagnostic> {
        None
    }
}

pub(crate) type BuildFn =
    Arc<dyn Fn(&mut TreeEditor) -> Result<Option<RewriteResult>> + Send + Sync>;

/// A type-erased candidate, ready to be built
#[derive(Clone)]
pub struct Offer {
    pub title: String,
    pub equivalence_key: String,
    pub diagnostic: Option<Diagnostic>,
    pub(crate) build: BuildFn,
}

impl Offer {
    pub fn build(&self, editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        (self.build)(editor)
    }
}

impl fmt::Debug for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Offer")
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .field("diagnostic", &self.diagnostic)
            .finish_non_exhaustive()
    }
}

/// Object-safe view of a [`Rule`]
#[async_trait]
pub trait DynRule: Send + Sync {
    fn metadata(&self) -> &RuleMetadata;

    fn node_kinds(&self) -> &'static [SyntaxKind];

    async fn offers(&self, node: &SyntaxNode, ctx: &MatchContext) -> Result<Vec<Offer>>;
}

/// Adapter erasing a rule's payload type
pub struct RuleHandle<R>(Arc<R>);

impl<R: Rule> RuleHandle<R> {
    pub fn new(rule: R) -> Self {
        Self(Arc::new(rule))
    }
}

#[async_trait]
impl<R: Rule> DynRule for RuleHandle<R> {
    fn metadata(&self) -> &RuleMetadata {
        self.0.metadata()
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        self.0.node_kinds()
    }

    async fn offers(&self, node: &SyntaxNode, ctx: &MatchContext) -> Result<Vec<Offer>> {
        let candidates = self.0.matches(node, ctx).await?;
        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let diagnostic = self.0.diagnostic(node, &candidate.payload);
                let rule = Arc::clone(&self.0);
                let payload = Arc::new(candidate.payload);
                Offer {
                    title: candidate.title,
                    equivalence_key: candidate.equivalence_key,
                    diagnostic,
                    build: Arc::new(move |editor: &mut TreeEditor| rule.build(&payload, editor)),
                }
            })
            .collect())
    }
}

/// Box a rule for the registry
pub fn boxed<R: Rule>(rule: R) -> Arc<dyn DynRule> {
    Arc::new(RuleHandle::new(rule))
}
