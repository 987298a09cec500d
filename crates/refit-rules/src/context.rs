//! Per-request state handed to matchers

use crate::builders::trivia::newline_for;
use refit_core::{
    CancellationToken, RefitError, Result, SemanticCache, SemanticModel, SyntaxTree, TextRange,
};
use std::sync::Arc;

/// What a matcher may consult besides the node it is given
///
/// The semantic model is fetched lazily through the shared cache, so rules
/// whose syntactic filter fails never cause one to be computed.
#[derive(Clone)]
pub struct MatchContext {
    tree: SyntaxTree,
    selection: TextRange,
    cancel: CancellationToken,
    semantic: Arc<SemanticCache>,
    newline: String,
}

impl MatchContext {
    pub fn new(
        tree: SyntaxTree,
        selection: TextRange,
        cancel: CancellationToken,
        semantic: Arc<SemanticCache>,
        default_newline: &str,
    ) -> Self {
        let newline = newline_for(&tree, default_newline);
        Self {
            tree,
            selection,
            cancel,
            semantic,
            newline,
        }
    }

    /// Same request, narrowed to another selection
    pub fn with_selection(&self, selection: TextRange) -> Self {
        Self {
            selection,
            ..self.clone()
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn selection(&self) -> TextRange {
        self.selection
    }

    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }

    /// End-of-line text generated code should use
    pub fn newline(&self) -> &str {
        &self.newline
    }

    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(RefitError::Cancelled);
        }
        Ok(())
    }

    /// Semantic model of the request's snapshot, computed at most once
    pub async fn semantic_model(&self) -> Result<Arc<dyn SemanticModel>> {
        self.semantic.get(&self.tree, &self.cancel).await
    }
}

impl std::fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchContext")
            .field("snapshot", &self.tree.snapshot())
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
