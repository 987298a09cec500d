//! Remove the comment under the caret
//!
//! A comment alone on its line takes the whole line with it. A comment
//! after code loses the whitespace before it; one before code loses the
//! whitespace after it.

use crate::apply::RewriteResult;
use crate::context::MatchContext;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::{Result, SyntaxKind, SyntaxNode, TextEdit, TextRange, TextSize, TreeEditor};

pub const RULE_ID: &str = "remove-comment";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(RULE_ID, "Remove comment", "Delete the comment at the caret")
        .with_tags(&["comment", "trivia"])
});

#[derive(Debug, Default)]
pub struct RemoveComment;

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Range to delete for the comment at `comment` in `text`
pub fn removal_range(text: &str, comment: TextRange) -> TextRange {
    let start = usize::from(comment.start());
    let end = usize::from(comment.end());
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let before = &text[line_start..start];
    let after = &text[end..line_end];

    let (from, to) = if is_blank(before) && is_blank(after) {
        let through_newline = if line_end < text.len() { line_end + 1 } else { line_end };
        (line_start, through_newline)
    } else if is_blank(after) {
        (start - (before.len() - before.trim_end().len()), end)
    } else {
        (start, end + (after.len() - after.trim_start().len()))
    };
    TextRange::new(TextSize::from(from as u32), TextSize::from(to as u32))
}

#[async_trait]
impl Rule for RemoveComment {
    type Match = TextEdit;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::CompilationUnit]
    }

    async fn matches(&self, node: &SyntaxNode, ctx: &MatchContext) -> Result<Vec<Candidate<TextEdit>>> {
        let selection = ctx.selection();
        let Some(found) = node.tree().find_trivia(selection.start()) else {
            return Ok(Vec::new());
        };
        if !found.trivia.is_comment() || !found.range.contains_range(selection) {
            return Ok(Vec::new());
        }
        let range = removal_range(node.tree().text(), found.range);
        tracing::trace!(?range, "Comment removal");
        Ok(vec![Candidate::new(
            "Remove comment",
            RULE_ID,
            TextEdit::delete(range),
        )])
    }

    fn build(&self, found: &TextEdit, _editor: &mut TreeEditor) -> Result<Option<RewriteResult>> {
        Ok(Some(RewriteResult::TextEdit(found.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache};
    use std::sync::Arc;

    async fn remove(text: &str, marker: &str) -> Option<String> {
        let tree = parse(text).unwrap();
        let caret = TextSize::from((text.find(marker).unwrap() + 1) as u32);
        let ctx = MatchContext::new(
            tree.clone(),
            TextRange::empty(caret),
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        );
        let candidates = RemoveComment.matches(&tree.root(), &ctx).await.unwrap();
        let candidate = candidates.first()?;
        let mut editor = TreeEditor::new(&tree);
        let rewrite = RemoveComment.build(&candidate.payload, &mut editor).unwrap()?;
        Some(apply(editor, rewrite).unwrap().text().to_string())
    }

    #[tokio::test]
    async fn test_whole_line_comment() {
        let text = "class C\n{\n    // note\n    void M() { }\n}\n";
        assert_eq!(
            remove(text, "// note").await.as_deref(),
            Some("class C\n{\n    void M() { }\n}\n")
        );
    }

    #[tokio::test]
    async fn test_end_of_line_comment() {
        let text = "class C\n{\n    int x; // note\n}\n";
        assert_eq!(
            remove(text, "// note").await.as_deref(),
            Some("class C\n{\n    int x;\n}\n")
        );
    }

    #[tokio::test]
    async fn test_comment_before_code() {
        let text = "class C { /* a */ int x; }";
        assert_eq!(remove(text, "/* a").await.as_deref(), Some("class C { int x; }"));
    }

    #[tokio::test]
    async fn test_caret_outside_comment() {
        assert_eq!(remove("class C { int x; }", "int").await, None);
    }

    #[test]
    fn test_removal_range_at_end_of_text() {
        let text = "class C { }\n// last";
        let start = text.find("//").unwrap() as u32;
        let range = removal_range(text, TextRange::new(start.into(), (text.len() as u32).into()));
        assert_eq!(&text[usize::from(range.start())..usize::from(range.end())], "// last");
    }
}
