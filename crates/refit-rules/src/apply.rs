//! Document transaction applier

use refit_core::{NodeId, RefitError, Result, SyntaxNode, SyntaxTree, TextEdit, TreeEditor};

/// What a builder asks the applier to do
#[derive(Debug, Clone)]
pub enum RewriteResult {
    /// Swap one node for a new one
    Replace {
        original: SyntaxNode,
        replacement: NodeId,
    },
    /// Swap a contiguous run of siblings for zero or more new nodes
    ReplaceRange {
        originals: Vec<SyntaxNode>,
        replacements: Vec<NodeId>,
    },
    /// Textual edit inside the trivia of a single token
    TextEdit(TextEdit),
}

impl RewriteResult {
    pub fn replace(original: &SyntaxNode, replacement: NodeId) -> Self {
        RewriteResult::Replace {
            original: original.clone(),
            replacement,
        }
    }

    pub fn replace_range(originals: Vec<SyntaxNode>, replacements: Vec<NodeId>) -> Self {
        RewriteResult::ReplaceRange {
            originals,
            replacements,
        }
    }
}

/// Apply `rewrite` to the editor's base tree, producing a new snapshot
///
/// The base tree is left untouched. Originals belonging to another
/// snapshot fail with [`RefitError::StaleTree`].
#[tracing::instrument(level = "debug", skip_all, fields(snapshot = %editor.base().snapshot()))]
pub fn apply(mut editor: TreeEditor, rewrite: RewriteResult) -> Result<SyntaxTree> {
    let root = match rewrite {
        RewriteResult::Replace {
            original,
            replacement,
        } => editor.replace_node(&original, replacement)?,
        RewriteResult::ReplaceRange {
            originals,
            replacements,
        } => {
            let (Some(first), Some(last)) = (originals.first(), originals.last()) else {
                return Err(RefitError::invalid_edit("range replacement without originals"));
            };
            let contiguous = originals.windows(2).all(|pair| {
                pair[0].parent() == pair[1].parent() && pair[0].index() + 1 == pair[1].index()
            });
            if !contiguous {
                return Err(RefitError::invalid_edit(
                    "range replacement originals are not contiguous siblings",
                ));
            }
            editor.replace_range(first, last, replacements)?
        }
        RewriteResult::TextEdit(edit) => editor.edit_trivia(&edit)?,
    };
    let tree = editor.finish(root);
    tracing::debug!(new_snapshot = %tree.snapshot(), "Rewrite applied");
    Ok(tree)
}
