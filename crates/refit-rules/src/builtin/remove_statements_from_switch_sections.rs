//! Empty the selected sections of a `switch`
//!
//! Every selected section loses its statements and keeps its labels. The
//! line break that ended the last removed statement ends the section, so
//! the next label stays on its own line.

use crate::apply::RewriteResult;
use crate::builders::trivia::{blank_suffix, trim_end};
use crate::context::MatchContext;
use crate::matchers::selection::SelectedNodes;
use crate::rule::{Candidate, Rule, RuleMetadata};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use refit_core::{Result, SyntaxKind, SyntaxNode, TreeEditor};

pub const RULE_ID: &str = "remove-statements-from-switch-sections";

static METADATA: Lazy<RuleMetadata> = Lazy::new(|| {
    RuleMetadata::refactoring(
        RULE_ID,
        "Remove statements from switch sections",
        "Delete the statements of the selected switch sections, keeping their labels",
    )
    .with_tags(&["switch"])
});

#[derive(Debug)]
pub struct SwitchSectionsMatch {
    switch: SyntaxNode,
    /// Selected sections that hold at least one statement
    sections: Vec<SyntaxNode>,
}

#[derive(Debug, Default)]
pub struct RemoveStatementsFromSwitchSections;

fn has_statements(section: &SyntaxNode) -> bool {
    section.child_nodes().any(|n| n.kind().is_statement())
}

#[async_trait]
impl Rule for RemoveStatementsFromSwitchSections {
    type Match = SwitchSectionsMatch;

    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    fn node_kinds(&self) -> &'static [SyntaxKind] {
        &[SyntaxKind::SwitchStatement]
    }

    async fn matches(
        &self,
        node: &SyntaxNode,
        ctx: &MatchContext,
    ) -> Result<Vec<Candidate<SwitchSectionsMatch>>> {
        let Some(selection) = SelectedNodes::switch_sections(node, ctx.selection()) else {
            return Ok(Vec::new());
        };
        let sections: Vec<SyntaxNode> = selection
            .selected()
            .iter()
            .filter(|section| has_statements(section))
            .cloned()
            .collect();
        if sections.is_empty() {
            return Ok(Vec::new());
        }
        let title = if selection.are_many_selected() {
            "Remove statements from sections"
        } else {
            "Remove statements from section"
        };
        Ok(vec![Candidate::new(
            title,
            RULE_ID,
            SwitchSectionsMatch {
                switch: node.clone(),
                sections,
            },
        )])
    }

    fn build(
        &self,
        found: &SwitchSectionsMatch,
        editor: &mut TreeEditor,
    ) -> Result<Option<RewriteResult>> {
        let mut children = editor.children(found.switch.id());
        for section in &found.sections {
            let labels: Vec<_> = section
                .children()
                .filter(|child| !child.kind().is_statement())
                .collect();
            let Some(last_label) = labels.last() else {
                return Ok(None);
            };
            let mut trailing = trim_end(&last_label.trailing_trivia());
            trailing.extend(blank_suffix(&section.trailing_trivia()));

            let ids = labels.iter().map(SyntaxNode::id).collect();
            let emptied = editor.node(SyntaxKind::SwitchSection, ids);
            children[section.index()] = editor.with_trailing_trivia(emptied, trailing);
        }
        let replacement = editor.node(SyntaxKind::SwitchStatement, children);
        Ok(Some(RewriteResult::replace(&found.switch, replacement)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply;
    use refit_core::syntax::parse;
    use refit_core::{CancellationToken, FixtureProvider, SemanticCache, TextRange, TextSize};
    use std::sync::Arc;

    async fn offers(text: &str, start: usize, end: usize) -> Vec<(String, String)> {
        let tree = parse(text).unwrap();
        let selection = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
        let ctx = MatchContext::new(
            tree.clone(),
            selection,
            CancellationToken::new(),
            Arc::new(SemanticCache::new(Arc::new(FixtureProvider::new()))),
            "\n",
        );
        let switch = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::SwitchStatement)
            .unwrap();
        let candidates = RemoveStatementsFromSwitchSections
            .matches(&switch, &ctx)
            .await
            .unwrap();
        candidates
            .iter()
            .map(|candidate| {
                let mut editor = TreeEditor::new(&tree);
                let rewrite = RemoveStatementsFromSwitchSections
                    .build(&candidate.payload, &mut editor)
                    .unwrap()
                    .unwrap();
                let output = apply(editor, rewrite).unwrap().text().to_string();
                (candidate.title.clone(), output)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_removes_statements_of_selected_sections() {
        let text = "class C { void M(int x) { switch (x) { case 1: a(); break; case 2: b(); break; default: c(); break; } } }";
        let start = text.find("case 1").unwrap();
        let end = text.find("default").unwrap() - 1;
        let found = offers(text, start, end).await;
        assert_eq!(
            found,
            vec![(
                "Remove statements from sections".to_string(),
                "class C { void M(int x) { switch (x) { case 1: case 2: default: c(); break; } } }"
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_label_comment_and_line_break_stay() {
        let text = "class C\n{\n    void M(int x)\n    {\n        switch (x)\n        {\n            case 1: // one\n                a();\n                break;\n            default:\n                c();\n                break;\n        }\n    }\n}\n";
        let start = text.find("case 1").unwrap();
        let end = text.find("break;").unwrap() + "break;".len();
        let found = offers(text, start, end).await;
        assert_eq!(
            found,
            vec![(
                "Remove statements from section".to_string(),
                "class C\n{\n    void M(int x)\n    {\n        switch (x)\n        {\n            case 1: // one\n            default:\n                c();\n                break;\n        }\n    }\n}\n"
                    .to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_nothing_to_remove() {
        let text = "class C { void M(int x) { switch (x) { case 1: b(); break; default: } } }";
        // a caret inside a section selects no section
        let caret = text.find("b()").unwrap();
        assert!(offers(text, caret, caret).await.is_empty());
        // the only selected section is already empty
        let start = text.find("default").unwrap();
        let end = start + "default:".len();
        assert!(offers(text, start, end).await.is_empty());
    }
}
