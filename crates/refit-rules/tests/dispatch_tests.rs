//! End-to-end tests for the dispatcher with the built-in rule set
//!
//! Each test parses a document, asks the dispatcher for code actions or
//! diagnostics and applies what it gets back.

use insta::assert_snapshot;
use refit_core::syntax::parse;
use refit_core::{
    AllRules, CancellationToken, ErrorKind, FixtureProvider, RefitError, RuleFilter,
    RulesConfiguration, SyntaxKind, SyntaxTree, TextRange, TextSize,
};
use refit_rules::builtin::{
    SplitIfElse, merge_local_declaration_with_return, replace_method_with_element_access,
    swap_if_else,
};
use refit_rules::{BuiltinRules, CodeAction, CodeActionRequest, Dispatcher, RuleRegistry, boxed};
use std::sync::Arc;

fn dispatcher() -> Dispatcher {
    let registry = BuiltinRules::registry().unwrap();
    Dispatcher::new(Arc::new(registry), Arc::new(FixtureProvider::new()))
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// Caret placed right after the first occurrence of `marker`'s first character
fn caret_at(text: &str, marker: &str) -> TextRange {
    let offset = text.find(marker).unwrap() + 1;
    range(offset, offset)
}

/// Selection covering `from` up to the end of `to`
fn select(text: &str, from: &str, to: &str) -> TextRange {
    let start = text.find(from).unwrap();
    let end = text.rfind(to).unwrap() + to.len();
    range(start, end)
}

async fn actions_with(
    dispatcher: &Dispatcher,
    tree: &SyntaxTree,
    selection: TextRange,
    filter: &dyn RuleFilter,
) -> Vec<CodeAction> {
    let request = CodeActionRequest::new(tree.clone(), selection);
    dispatcher.code_actions(&request, filter).await.unwrap()
}

async fn actions(tree: &SyntaxTree, selection: TextRange) -> Vec<CodeAction> {
    actions_with(&dispatcher(), tree, selection, &AllRules).await
}

fn titles(actions: &[CodeAction]) -> String {
    actions
        .iter()
        .map(|action| action.title.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn apply(action: &CodeAction) -> String {
    action
        .apply(&CancellationToken::new())
        .unwrap()
        .unwrap()
        .text()
        .to_string()
}

#[tokio::test]
async fn test_split_if_else_chain() {
    let text = "class C { void M() { if (x) A(); else if (y) B(); else C(); } }";
    let tree = parse(text).unwrap();
    let found = actions(&tree, select(text, "if (x)", "else C();")).await;

    assert_snapshot!(titles(&found), @"Split if-else");
    assert_eq!(
        apply(&found[0]),
        "class C { void M() { if (x) A();\nif (y) B();\nC(); } }"
    );
    // the request's snapshot is untouched
    assert_eq!(tree.text(), text);
}

#[tokio::test]
async fn test_swap_if_else() {
    let text = "class C { void M() { if (a < b) x(); else y(); } }";
    let tree = parse(text).unwrap();
    let found = actions(&tree, select(text, "if (a", "else y();")).await;

    assert_snapshot!(titles(&found), @"Swap statements in if-else");
    assert_eq!(found[0].rule_id, swap_if_else::RULE_ID);
    assert_eq!(
        apply(&found[0]),
        "class C { void M() { if (a >= b) y(); else x(); } }"
    );
}

#[tokio::test]
async fn test_caret_on_operator_anchors_on_binary_expression() {
    let text = "class C { void M() { if (a < b) x(); else y(); } }";
    let tree = parse(text).unwrap();
    let found = actions(&tree, caret_at(text, " < ")).await;

    assert_snapshot!(titles(&found), @"Negate operator");
    assert_eq!(
        apply(&found[0]),
        "class C { void M() { if (a >= b) x(); else y(); } }"
    );
}

#[tokio::test]
async fn test_replace_any_with_count() {
    let text = "class C { List<string> list; bool M() { return list.Any(); } }";
    let tree = parse(text).unwrap();
    let dispatcher = dispatcher();
    let found = actions_with(&dispatcher, &tree, caret_at(text, "Any"), &AllRules).await;

    assert_snapshot!(titles(&found), @"Replace 'Any' with 'Count > 0'");
    let diagnostic = found[0].diagnostic().unwrap();
    assert_eq!(&text[diagnostic.range], "Any()");
    assert_eq!(
        apply(&found[0]),
        "class C { List<string> list; bool M() { return list.Count > 0; } }"
    );
    assert_eq!(dispatcher.semantic_cache().len(), 1);

    dispatcher.release(&tree);
    assert!(dispatcher.semantic_cache().is_empty());
}

#[tokio::test]
async fn test_generate_enum_values_at_member() {
    let text = "[Flags]\nenum E\n{\n    A,\n    B,\n    C\n}\n";
    let tree = parse(text).unwrap();
    let offset = text.find("A,").unwrap();
    let found = actions(&tree, range(offset, offset)).await;

    let generate = found
        .iter()
        .find(|action| action.title == "Generate enum values")
        .unwrap();
    assert_eq!(
        apply(generate),
        "[Flags]\nenum E\n{\n    A = 0,\n    B = 1,\n    C = 2\n}\n"
    );
}

#[tokio::test]
async fn test_sort_members_is_idempotent() {
    let text = "class C {\n    void b() { }\n    void A() { }\n}\n";
    let tree = parse(text).unwrap();
    let found = actions(&tree, select(text, "void b", "A() { }")).await;

    assert_snapshot!(titles(&found), @"Sort members by name");
    let sorted = apply(&found[0]);
    assert_eq!(sorted, "class C {\n    void A() { }\n    void b() { }\n}\n");

    let sorted_tree = parse(&sorted).unwrap();
    let again = actions(&sorted_tree, select(&sorted, "void A", "b() { }")).await;
    assert!(again.is_empty(), "unexpected actions: {}", titles(&again));
}

#[tokio::test]
async fn test_remove_comment_keeps_surrounding_code() {
    let text = "class C\n{\n    // note\n    void M() { }\n}\n";
    let tree = parse(text).unwrap();
    let found = actions(&tree, caret_at(text, "// note")).await;

    assert_snapshot!(titles(&found), @"Remove comment");
    assert_eq!(apply(&found[0]), "class C\n{\n    void M() { }\n}\n");
}

/// Total length of the comments in a tree
fn comment_len(tree: &SyntaxTree) -> usize {
    tree.root()
        .descendant_tokens()
        .flat_map(|token| {
            let mut trivia = token.leading_trivia();
            trivia.extend(token.trailing_trivia());
            trivia
        })
        .filter(|trivia| trivia.is_comment())
        .map(|trivia| trivia.text.len())
        .sum()
}

fn span_of(tree: &SyntaxTree, kind: SyntaxKind) -> TextRange {
    tree.root()
        .descendants()
        .find(|node| node.kind() == kind)
        .unwrap()
        .span()
}

/// Apply the action titled `title` and check no comment was lost or copied
async fn assert_keeps_comments(text: &str, selection: TextRange, title: &str) {
    let tree = parse(text).unwrap();
    assert!(comment_len(&tree) > 0);
    let found = actions(&tree, selection).await;
    let Some(action) = found.iter().find(|a| a.title == title) else {
        panic!("'{title}' not offered, got: {}", titles(&found));
    };
    let rewritten = action.apply(&CancellationToken::new()).unwrap().unwrap();
    assert_eq!(comment_len(&rewritten), comment_len(&tree), "{title}");
}

#[tokio::test]
async fn test_rewrites_keep_comments() {
    let text = "class C\n{\n    void M()\n    {\n        if (ok) // check\n        {\n            x();\n        }\n        else\n        {\n            y(); // fallback\n        }\n    }\n}\n";
    let if_span = span_of(&parse(text).unwrap(), SyntaxKind::IfStatement);
    assert_keeps_comments(text, if_span, "Swap statements in if-else").await;

    let text = "class C\n{\n    void M()\n    {\n        if (x)\n            A();\n        else /* y */ if (y)\n            B(); // b\n        else\n            C();\n    }\n}\n";
    let if_span = span_of(&parse(text).unwrap(), SyntaxKind::IfStatement);
    assert_keeps_comments(text, if_span, "Split if-else").await;

    let text = "class C { void M() { if (a /* lhs */ < b) x(); // done\n } }";
    assert_keeps_comments(text, caret_at(text, " < "), "Negate operator").await;

    let text = "class C { void M() { if (o /* obj */ is string) x(); } }";
    assert_keeps_comments(text, caret_at(text, " is "), "Negate is").await;

    let text = "class C\n{\n    // bee\n    void b() { }\n    void A() { } // ay\n}\n";
    assert_keeps_comments(text, select(text, "void b", "A() { }"), "Sort members by name").await;

    let text = "enum E\n{\n    Charlie, // c\n    /* a */ Alpha,\n    Bravo\n}\n";
    assert_keeps_comments(text, select(text, "Charlie", "Bravo"), "Sort enum members by name").await;

    let text = "[Flags]\nenum E\n{\n    A, // first\n    /* b */ B\n}\n";
    let offset = text.find("A,").unwrap();
    assert_keeps_comments(text, range(offset, offset), "Generate enum values").await;

    let text = "[Flags]\nenum E\n{\n    A = 1,\n    B = 2 // two\n}\n";
    let offset = text.find("A =").unwrap();
    assert_keeps_comments(text, range(offset, offset), "Generate enum member").await;

    let text = "class C\n{\n    int M()\n    {\n        // compute\n        int n = 1 + 2;\n        return n; // done\n    }\n}\n";
    let return_span = span_of(&parse(text).unwrap(), SyntaxKind::ReturnStatement);
    assert_keeps_comments(text, return_span, "Merge local declaration with return statement").await;

    let text = "class C { List<string> list; bool M() { return list /* l */.Any(); } }";
    assert_keeps_comments(text, caret_at(text, "Any"), "Replace 'Any' with 'Count > 0'").await;

    let text = "class C { List<int> items; object M() { return items.First() /* head */; } }";
    assert_keeps_comments(text, caret_at(text, "First"), "Replace 'First' with '[]'").await;
}

#[tokio::test]
async fn test_element_access_skips_calls_holding_comments() {
    let text = "class C { List<int> items; object M() { return items.First(/* f */); } }";
    let tree = parse(text).unwrap();
    let found = actions(&tree, caret_at(text, "First")).await;
    assert!(
        found
            .iter()
            .all(|a| a.rule_id != replace_method_with_element_access::RULE_ID),
        "unexpected actions: {}",
        titles(&found)
    );
}

#[tokio::test]
async fn test_disabled_rule_is_skipped() {
    let text = "class C { void M() { if (a < b) x(); else y(); } }";
    let tree = parse(text).unwrap();
    let filter = RulesConfiguration {
        disabled: Some(vec![swap_if_else::RULE_ID.to_string()]),
        ..Default::default()
    };
    let found = actions_with(&dispatcher(), &tree, select(text, "if (a", "else y();"), &filter).await;
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_cancelled_request() {
    let text = "class C { void M() { if (a < b) x(); else y(); } }";
    let tree = parse(text).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let request = CodeActionRequest::new(tree.clone(), select(text, "if (a", "else y();"))
        .with_cancel(cancel.clone());
    let result = dispatcher().code_actions(&request, &AllRules).await;
    assert!(matches!(result, Err(RefitError::Cancelled)));

    let result = dispatcher().analyze(&tree, &AllRules, &cancel).await;
    assert!(matches!(result, Err(RefitError::Cancelled)));
}

#[tokio::test]
async fn test_cancelled_apply_leaves_tree_alone() {
    let text = "class C { void M() { if (a < b) x(); else y(); } }";
    let tree = parse(text).unwrap();
    let found = actions(&tree, select(text, "if (a", "else y();")).await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = found[0].apply(&cancel);
    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(found[0].tree().text(), text);
}

#[tokio::test]
async fn test_analyze_reports_merge_with_fade_out() {
    let text = "class C { int M() { int n = 1 + 2; return n; } }";
    let tree = parse(text).unwrap();
    let diagnostics = dispatcher()
        .analyze(&tree, &AllRules, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.rule_id, merge_local_declaration_with_return::RULE_ID);
    assert_snapshot!(&text[diagnostic.range], @"int n = 1 + 2; return n;");
    let faded: Vec<&str> = diagnostic.fade_out.iter().map(|r| &text[*r]).collect();
    assert_eq!(faded, vec!["int", "n", "=", ";", "n"]);
}

#[test]
fn test_analyze_batch_keeps_input_order() {
    let texts = [
        "class C { List<int> items; bool M() { return items.Any(); } }",
        "class C { void M() { } }",
        "class C { string M() { string s = Foo(); return s; } }",
    ];
    let trees: Vec<SyntaxTree> = texts.iter().map(|t| parse(t).unwrap()).collect();
    let dispatcher = dispatcher();
    let results = dispatcher.analyze_batch(&trees, &AllRules, &CancellationToken::new());
    assert!(dispatcher.semantic_cache().is_empty());

    let ids: Vec<Vec<String>> = results
        .into_iter()
        .map(|result| result.unwrap().into_iter().map(|d| d.rule_id).collect())
        .collect();
    assert_eq!(
        ids,
        vec![
            vec!["replace-any-with-count-or-length".to_string()],
            vec![],
            vec![merge_local_declaration_with_return::RULE_ID.to_string()],
        ]
    );
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let mut registry = BuiltinRules::registry().unwrap();
    let err = registry.register(boxed(SplitIfElse)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rule);
    assert_eq!(registry.len(), BuiltinRules::all().len());

    let doubled = BuiltinRules::all().into_iter().chain(BuiltinRules::all());
    assert!(RuleRegistry::with_rules(doubled).is_err());
}
