//! Span and trivia predicates
//!
//! A node has an inner span `I` (its text without outer trivia) and an
//! outer full span `O`. These predicates decide whether a selection `S`
//! maps onto a node:
//!
//! - [`contains`]: `S` lies within `I`
//! - [`is_between`]: `S` covers `I` and stays within `O`, so it only
//!   reaches into the surrounding trivia
//! - [`is_empty_and_contained_or_between`]: a caret must be inside `I`;
//!   a non-empty selection must satisfy [`is_between`]

use crate::syntax::SyntaxNode;
use biome_text_size::TextRange;

pub fn contains(inner: TextRange, selection: TextRange) -> bool {
    inner.contains_range(selection)
}

pub fn is_between(selection: TextRange, inner: TextRange, outer: TextRange) -> bool {
    selection.start() >= outer.start()
        && selection.start() <= inner.start()
        && selection.end() >= inner.end()
        && selection.end() <= outer.end()
}

pub fn is_empty_and_contained_or_between(
    selection: TextRange,
    inner: TextRange,
    outer: TextRange,
) -> bool {
    if selection.is_empty() {
        contains(inner, selection)
    } else {
        is_between(selection, inner, outer)
    }
}

pub fn is_contained_or_between(selection: TextRange, inner: TextRange, outer: TextRange) -> bool {
    contains(inner, selection) || is_between(selection, inner, outer)
}

/// Span predicates evaluated against a node's own spans
pub trait SelectionExt {
    fn contains_selection(&self, selection: TextRange) -> bool;
    fn is_between_spans(&self, selection: TextRange) -> bool;
    fn is_empty_and_contained_or_between(&self, selection: TextRange) -> bool;
    fn is_contained_or_between(&self, selection: TextRange) -> bool;
}

impl SelectionExt for SyntaxNode {
    fn contains_selection(&self, selection: TextRange) -> bool {
        contains(self.span(), selection)
    }

    fn is_between_spans(&self, selection: TextRange) -> bool {
        is_between(selection, self.span(), self.full_span())
    }

    fn is_empty_and_contained_or_between(&self, selection: TextRange) -> bool {
        is_empty_and_contained_or_between(selection, self.span(), self.full_span())
    }

    fn is_contained_or_between(&self, selection: TextRange) -> bool {
        is_contained_or_between(selection, self.span(), self.full_span())
    }
}

/// Whether every trivia item under `node` overlapping `range` is whitespace
/// or an end of line
///
/// Trivia that only touches the range boundary does not count.
pub fn all_whitespace_or_end_of_line(node: &SyntaxNode, range: TextRange) -> bool {
    node.trivia_with_ranges()
        .iter()
        .filter(|(trivia_range, _)| overlaps(*trivia_range, range))
        .all(|(_, trivia)| trivia.is_whitespace_or_end_of_line())
}

fn overlaps(a: TextRange, b: TextRange) -> bool {
    a.start() < b.end() && b.start() < a.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{SyntaxKind, parse};
    use biome_text_size::TextSize;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_is_between() {
        let inner = range(4, 10);
        let outer = range(2, 12);
        assert!(is_between(range(4, 10), inner, outer));
        assert!(is_between(range(2, 12), inner, outer));
        assert!(is_between(range(3, 11), inner, outer));
        assert!(!is_between(range(5, 10), inner, outer));
        assert!(!is_between(range(4, 9), inner, outer));
        assert!(!is_between(range(1, 10), inner, outer));
        assert!(!is_between(range(4, 13), inner, outer));
    }

    #[test]
    fn test_empty_selection_requires_containment() {
        let inner = range(4, 10);
        let outer = range(2, 12);
        assert!(is_empty_and_contained_or_between(range(4, 4), inner, outer));
        assert!(is_empty_and_contained_or_between(range(10, 10), inner, outer));
        assert!(!is_empty_and_contained_or_between(range(3, 3), inner, outer));
        assert!(!is_empty_and_contained_or_between(range(5, 7), inner, outer));
        assert!(is_contained_or_between(range(5, 7), inner, outer));
    }

    #[test]
    fn test_node_predicates() {
        let text = "class C { void M() {  x();  } }";
        let tree = parse(text).unwrap();
        let statement = tree
            .root()
            .descendants()
            .find(|n| n.kind() == SyntaxKind::ExpressionStatement)
            .unwrap();
        let start = text.find("x();").unwrap() as u32;
        assert!(statement.contains_selection(range(start, start)));
        assert!(statement.is_between_spans(range(start, start + 5)));
        assert!(!statement.is_between_spans(range(start + 1, start + 5)));
        assert!(!statement.is_empty_and_contained_or_between(range(start - 1, start - 1)));
    }

    #[test]
    fn test_whitespace_only_between_statements() {
        let text = "class C { void M() { a(); /* note */ b(); c(); } }";
        let tree = parse(text).unwrap();
        let root = tree.root();
        let a = text.find("a();").unwrap() as u32;
        let b_end = (text.find("b();").unwrap() + 4) as u32;
        let c_end = (text.find("c();").unwrap() + 4) as u32;
        assert!(!all_whitespace_or_end_of_line(&root, range(a, b_end)));
        assert!(all_whitespace_or_end_of_line(&root, range(b_end - 4, c_end)));
    }
}
