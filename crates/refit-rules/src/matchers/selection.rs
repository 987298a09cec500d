//! Which siblings of a list a selection covers

use refit_core::syntax::ast::{AstNode, EnumDeclaration, MemberContainer};
use refit_core::{SyntaxKind, SyntaxNode, TextRange};
use std::ops::RangeInclusive;

/// A non-empty run of selected nodes within a sibling list
///
/// Nodes starting before the selection are skipped; nodes are then taken
/// while the selection reaches their end. A selection starting inside a
/// node therefore never selects it.
#[derive(Debug, Clone)]
pub struct SelectedNodes {
    nodes: Vec<SyntaxNode>,
    first: usize,
    last: usize,
}

impl SelectedNodes {
    pub fn new(nodes: Vec<SyntaxNode>, selection: TextRange) -> Option<Self> {
        let first = nodes
            .iter()
            .position(|node| selection.start() <= node.span().start())?;
        let count = nodes[first..]
            .iter()
            .take_while(|node| selection.end() >= node.span().end())
            .count();
        if count == 0 {
            return None;
        }
        Some(Self {
            nodes,
            first,
            last: first + count - 1,
        })
    }

    /// Members of a namespace, class, struct or interface
    pub fn members(container: &MemberContainer, selection: TextRange) -> Option<Self> {
        Self::new(container.members().collect(), selection)
    }

    pub fn enum_members(declaration: &EnumDeclaration, selection: TextRange) -> Option<Self> {
        Self::new(
            declaration
                .members()
                .map(|member| member.syntax().clone())
                .collect(),
            selection,
        )
    }

    pub fn switch_sections(switch: &SyntaxNode, selection: TextRange) -> Option<Self> {
        Self::new(
            switch
                .child_nodes()
                .filter(|n| n.kind() == SyntaxKind::SwitchSection)
                .collect(),
            selection,
        )
    }

    /// The whole sibling list
    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    pub fn first_index(&self) -> usize {
        self.first
    }

    pub fn last_index(&self) -> usize {
        self.last
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }

    pub fn selected(&self) -> &[SyntaxNode] {
        &self.nodes[self.range()]
    }

    pub fn count(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn are_many_selected(&self) -> bool {
        self.count() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::TextSize;
    use refit_core::syntax::parse;

    const SOURCE: &str = "class C { int a; int b; int c; }";

    fn container() -> MemberContainer {
        parse(SOURCE)
            .unwrap()
            .root()
            .descendants()
            .find_map(MemberContainer::cast)
            .unwrap()
    }

    fn selection(from: &str, to: &str) -> TextRange {
        let start = SOURCE.find(from).unwrap();
        let end = SOURCE.find(to).unwrap() + to.len();
        TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
    }

    #[test]
    fn test_selects_whole_members() {
        let selected = SelectedNodes::members(&container(), selection("int a", "int b;")).unwrap();
        assert_eq!(selected.first_index(), 0);
        assert_eq!(selected.last_index(), 1);
        assert!(selected.are_many_selected());
        assert_eq!(selected.selected()[1].trimmed_text(), "int b;");
    }

    #[test]
    fn test_selection_starting_inside_a_member_skips_it() {
        let selected = SelectedNodes::members(&container(), selection("a;", "int c;")).unwrap();
        assert_eq!(selected.range(), 1..=2);
    }

    #[test]
    fn test_partial_last_member_is_not_taken() {
        let selected = SelectedNodes::members(&container(), selection("int a", "int b")).unwrap();
        assert_eq!(selected.count(), 1);
        assert!(!selected.are_many_selected());
    }

    #[test]
    fn test_switch_sections() {
        let text = "class C { void M(int x) { switch (x) { case 1: a(); break; default: b(); break; } } }";
        let switch = parse(text)
            .unwrap()
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::SwitchStatement)
            .unwrap();
        let start = text.find("default").unwrap();
        let end = text.rfind("break;").unwrap() + "break;".len();
        let range = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
        let selected = SelectedNodes::switch_sections(&switch, range).unwrap();
        assert_eq!(selected.nodes().len(), 2);
        assert_eq!(selected.range(), 1..=1);
    }

    #[test]
    fn test_nothing_selected() {
        assert!(SelectedNodes::members(&container(), selection("a;", "int b")).is_none());
    }
}
