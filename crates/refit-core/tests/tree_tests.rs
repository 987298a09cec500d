//! Integration tests for tree lookup, navigation and trivia ownership

use refit_core::syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TriviaKind, parse};
use refit_core::{TextRange, TextSize};

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

fn first(tree: &SyntaxTree, kind: SyntaxKind) -> SyntaxNode {
    tree.root()
        .descendants()
        .find(|n| n.kind() == kind)
        .unwrap_or_else(|| panic!("no {kind:?}"))
}

#[test]
fn test_find_token_prefers_token_starting_at_offset() {
    let text = "class C { void M() { x = a+b; } }";
    let tree = parse(text).unwrap();

    let plus = text.find('+').unwrap();
    let token = tree.find_token(TextSize::from(plus as u32)).unwrap();
    assert_eq!(token.kind(), SyntaxKind::Plus);

    let b = tree.find_token(TextSize::from(plus as u32 + 1)).unwrap();
    assert_eq!(b.token_text(), "b");

    let end = tree.find_token(TextSize::of(text)).unwrap();
    assert!(end.full_span().end() == TextSize::of(text));
}

#[test]
fn test_find_node_innermost_and_outermost() {
    let text = "class C { void M() { Call(value); } }";
    let tree = parse(text).unwrap();
    let start = text.find("value").unwrap();
    let selection = range(start, start + "value".len());

    let inner = tree.find_node(selection, true).unwrap();
    assert_eq!(inner.kind(), SyntaxKind::IdentifierName);

    let outer = tree.find_node(selection, false).unwrap();
    assert_eq!(outer.kind(), SyntaxKind::Argument);
    assert_eq!(outer.full_span(), inner.full_span());
}

#[test]
fn test_find_node_walks_up_to_cover_the_range() {
    let text = "class C { void M() { x = a + b; } }";
    let tree = parse(text).unwrap();
    let start = text.find("a + b").unwrap();
    let node = tree
        .find_node(range(start, start + "a + b".len()), true)
        .unwrap();
    assert_eq!(node.kind(), SyntaxKind::AddExpression);
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "outside"))]
fn test_find_node_out_of_range_is_a_contract_violation() {
    let tree = parse("class C { }").unwrap();
    assert!(tree.find_node(range(0, 500), true).is_none());
}

#[test]
fn test_trivia_ownership() {
    let text = "class C {\n    /// <summary>Doc</summary>\n    int a; // note\n}\n";
    let tree = parse(text).unwrap();
    assert_eq!(tree.text(), text);

    let field = first(&tree, SyntaxKind::FieldDeclaration);
    let leading = field.leading_trivia();
    assert!(
        leading
            .iter()
            .any(|t| t.kind == TriviaKind::SingleLineDocComment)
    );

    let trailing = field.trailing_trivia();
    assert!(trailing.iter().any(|t| t.kind == TriviaKind::SingleLineComment));
    assert!(trailing.last().unwrap().is_end_of_line());
    assert_eq!(field.trimmed_text(), "int a;");
}

#[test]
fn test_find_trivia() {
    let text = "class C { int a; /* c */ }";
    let tree = parse(text).unwrap();
    let offset = text.find("/*").unwrap() + 1;

    let found = tree.find_trivia(TextSize::from(offset as u32)).unwrap();
    assert_eq!(found.trivia.kind, TriviaKind::MultiLineComment);
    assert_eq!(found.trivia.text, "/* c */");
    assert!(!found.leading);
    assert_eq!(found.token.kind(), SyntaxKind::Semicolon);

    let inside_token = text.find("int").unwrap();
    assert!(
        tree.find_trivia(TextSize::from(inside_token as u32))
            .is_none()
    );
}

#[test]
fn test_navigation() {
    let tree = parse("class C { void M() { a(); b(); c(); } }").unwrap();
    let block = first(&tree, SyntaxKind::Block);
    let statements: Vec<_> = block.child_nodes().collect();
    assert_eq!(statements.len(), 3);

    assert_eq!(statements[0].next_sibling(), Some(statements[1].clone()));
    assert_eq!(statements[2].prev_sibling(), Some(statements[1].clone()));
    assert_eq!(statements[1].parent(), Some(block.clone()));

    let kinds: Vec<_> = statements[0].ancestors().map(|n| n.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            SyntaxKind::Block,
            SyntaxKind::MethodDeclaration,
            SyntaxKind::ClassDeclaration,
            SyntaxKind::CompilationUnit,
        ]
    );

    assert_eq!(block.first_token().unwrap().kind(), SyntaxKind::OpenBrace);
    assert_eq!(block.last_token().unwrap().kind(), SyntaxKind::CloseBrace);
    assert_eq!(block.child_tokens().count(), 2);
}

#[test]
fn test_nodes_from_different_snapshots_differ() {
    let a = parse("class C { }").unwrap();
    let b = parse("class C { }").unwrap();
    let class_a = first(&a, SyntaxKind::ClassDeclaration);
    let class_b = first(&b, SyntaxKind::ClassDeclaration);
    assert_eq!(class_a.full_span(), class_b.full_span());
    assert_ne!(class_a, class_b);
    assert_eq!(class_a, first(&a, SyntaxKind::ClassDeclaration));
}

#[test]
fn test_descendants_are_in_source_order() {
    let text = "class C { int a; int b; }";
    let tree = parse(text).unwrap();
    let rendered: String = tree
        .root()
        .descendant_tokens()
        .map(|t| t.text())
        .collect();
    assert_eq!(rendered, text);
}
