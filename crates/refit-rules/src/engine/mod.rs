//! Rule dispatch
//!
//! The [`Dispatcher`] answers two questions about a document:
//!
//! - which rewrites are available at a selection ([`Dispatcher::code_actions`])
//! - which analyzer findings the whole document has ([`Dispatcher::analyze`])
//!
//! Both walk syntax nodes, hand each one to the enabled rules registered
//! for its kind and collect what the rules offer. Rules never see each
//! other's results.

pub mod registry;

pub use registry::RuleRegistry;

use crate::apply::apply;
use crate::context::MatchContext;
use crate::rule::{DynRule, Offer};
use rayon::prelude::*;
use refit_core::{
    CancellationToken, Diagnostic, DiagnosticSink, RefitError, Result, RuleFilter, SemanticCache,
    SemanticModelProvider, SyntaxNode, SyntaxTree, TextRange, TreeEditor,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A request for the rewrites available at a selection
#[derive(Debug, Clone)]
pub struct CodeActionRequest {
    pub tree: SyntaxTree,
    pub selection: TextRange,
    pub cancel: CancellationToken,
}

impl CodeActionRequest {
    pub fn new(tree: SyntaxTree, selection: TextRange) -> Self {
        Self {
            tree,
            selection,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A rewrite offered at a selection
#[derive(Clone)]
pub struct CodeAction {
    pub rule_id: String,
    pub title: String,
    pub equivalence_key: String,
    tree: SyntaxTree,
    offer: Offer,
}

impl CodeAction {
    /// Build and apply the rewrite
    ///
    /// Returns `Ok(None)` when the rewrite turned out not to apply.
    /// The tree the action was computed for is never modified.
    pub fn apply(&self, cancel: &CancellationToken) -> Result<Option<SyntaxTree>> {
        if cancel.is_cancelled() {
            return Err(RefitError::Cancelled);
        }
        let mut editor = TreeEditor::new(&self.tree);
        let Some(rewrite) = self.offer.build(&mut editor)? else {
            tracing::debug!(rule = %self.rule_id, "Rewrite no longer applies");
            return Ok(None);
        };
        if cancel.is_cancelled() {
            return Err(RefitError::Cancelled);
        }
        apply(editor, rewrite).map(Some)
    }

    /// The finding this action fixes, for analyzer rules
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.offer.diagnostic.as_ref()
    }

    /// Snapshot the action was computed against
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }
}

impl fmt::Debug for CodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeAction")
            .field("rule_id", &self.rule_id)
            .field("title", &self.title)
            .field("equivalence_key", &self.equivalence_key)
            .finish_non_exhaustive()
    }
}

/// Runs registered rules against documents
pub struct Dispatcher {
    registry: Arc<RuleRegistry>,
    semantic: Arc<SemanticCache>,
    default_newline: String,
}

impl Dispatcher {
    pub fn new(registry: Arc<RuleRegistry>, provider: Arc<dyn SemanticModelProvider>) -> Self {
        Self {
            registry,
            semantic: Arc::new(SemanticCache::new(provider)),
            default_newline: "\n".to_string(),
        }
    }

    /// End of line used by generated code in documents that have none
    pub fn with_default_newline(mut self, newline: &str) -> Self {
        self.default_newline = newline.to_string();
        self
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn semantic_cache(&self) -> &Arc<SemanticCache> {
        &self.semantic
    }

    /// Drop the semantic model cached for `tree`'s snapshot
    ///
    /// Call once a snapshot is superseded, typically by the tree a
    /// [`CodeAction`] produced, or when a document is closed.
    pub fn release(&self, tree: &SyntaxTree) {
        self.semantic.evict(tree.snapshot());
    }

    fn context(
        &self,
        tree: &SyntaxTree,
        selection: TextRange,
        cancel: &CancellationToken,
    ) -> MatchContext {
        MatchContext::new(
            tree.clone(),
            selection,
            cancel.clone(),
            Arc::clone(&self.semantic),
            &self.default_newline,
        )
    }

    /// Rewrites available at the request's selection
    ///
    /// Nodes are visited from the innermost node covering the selection
    /// outwards; rules in registry order. A rule contributes at the
    /// innermost node where it matched and is not asked again further out.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(snapshot = %request.tree.snapshot(), selection = ?request.selection)
    )]
    pub async fn code_actions(
        &self,
        request: &CodeActionRequest,
        filter: &dyn RuleFilter,
    ) -> Result<Vec<CodeAction>> {
        check(&request.cancel)?;
        let Some(start) = request.tree.find_node(request.selection, true) else {
            return Ok(Vec::new());
        };
        let ctx = self.context(&request.tree, request.selection, &request.cancel);

        let mut actions = Vec::new();
        let mut matched: HashSet<&str> = HashSet::new();
        for node in start.ancestors_and_self() {
            check(&request.cancel)?;
            for rule in self.registry.iter() {
                let id = rule.metadata().id.as_str();
                if matched.contains(id) || !filter.is_enabled(id) {
                    continue;
                }
                if !rule.node_kinds().contains(&node.kind()) {
                    continue;
                }
                check(&request.cancel)?;
                let offers = run_rule(rule, &node, &ctx).await?;
                if offers.is_empty() {
                    continue;
                }
                tracing::debug!(rule = %id, node = ?node, offers = offers.len(), "Rule matched");
                matched.insert(id);
                actions.extend(offers.into_iter().map(|offer| CodeAction {
                    rule_id: id.to_string(),
                    title: offer.title.clone(),
                    equivalence_key: offer.equivalence_key.clone(),
                    tree: request.tree.clone(),
                    offer,
                }));
            }
        }
        Ok(actions)
    }

    /// Findings of every enabled analyzer rule over the whole document
    pub async fn analyze(
        &self,
        tree: &SyntaxTree,
        filter: &dyn RuleFilter,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        self.analyze_into(tree, filter, cancel, &mut diagnostics)
            .await?;
        Ok(diagnostics)
    }

    /// Like [`analyze`](Self::analyze), reporting into `sink` as findings occur
    #[tracing::instrument(level = "debug", skip_all, fields(snapshot = %tree.snapshot()))]
    pub async fn analyze_into(
        &self,
        tree: &SyntaxTree,
        filter: &dyn RuleFilter,
        cancel: &CancellationToken,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<()> {
        check(cancel)?;
        let analyzers: Vec<&Arc<dyn DynRule>> = self
            .registry
            .iter()
            .filter(|rule| rule.metadata().analyzer && filter.is_enabled(&rule.metadata().id))
            .collect();
        if analyzers.is_empty() {
            return Ok(());
        }
        let ctx = self.context(tree, tree.full_span(), cancel);

        let mut reported = 0usize;
        for node in tree.root().descendants().filter(|n| !n.is_token()) {
            check(cancel)?;
            let node_ctx = ctx.with_selection(node.span());
            for &rule in &analyzers {
                if !rule.node_kinds().contains(&node.kind()) {
                    continue;
                }
                tracing::trace!(rule = %rule.metadata().id, node = ?node, "Analyzing");
                for offer in run_rule(rule, &node, &node_ctx).await? {
                    if let Some(diagnostic) = offer.diagnostic {
                        sink.report(diagnostic);
                        reported += 1;
                    }
                }
            }
        }
        tracing::debug!(diagnostics = reported, "Analysis finished");
        Ok(())
    }

    /// Analyze independent documents in parallel
    ///
    /// One result per document, in input order. Cancelling `cancel` stops
    /// every document still being analyzed. Each document's semantic model
    /// is released once its analysis is done.
    pub fn analyze_batch(
        &self,
        trees: &[SyntaxTree],
        filter: &dyn RuleFilter,
        cancel: &CancellationToken,
    ) -> Vec<Result<Vec<Diagnostic>>> {
        tracing::debug!(documents = trees.len(), "Analyzing batch");
        trees
            .par_iter()
            .map(|tree| {
                let result = futures::executor::block_on(self.analyze(tree, filter, cancel));
                self.release(tree);
                result
            })
            .collect()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("semantic", &self.semantic)
            .finish()
    }
}

fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(RefitError::Cancelled);
    }
    Ok(())
}

/// Run one rule, dropping its offers if it reports a recoverable failure
async fn run_rule(
    rule: &Arc<dyn DynRule>,
    node: &SyntaxNode,
    ctx: &MatchContext,
) -> Result<Vec<Offer>> {
    match rule.offers(node, ctx).await {
        Ok(offers) => Ok(offers),
        Err(err) if err.is_cancelled() => Err(err),
        Err(err) if err.is_recoverable() => {
            tracing::warn!(rule = %rule.metadata().id, error = %err, "Dropping rule offers");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}
