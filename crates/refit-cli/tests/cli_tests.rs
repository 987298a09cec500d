//! Integration tests for the refit CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SWAP_SOURCE: &str = "class C { void M() { if (a < b) x(); else y(); } }";
const MERGE_SOURCE: &str = "class C { int M() { int n = 1 + 2; return n; } }";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("refit").unwrap()
}

fn write_source(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

/// `start..end` covering the whole if statement of [`SWAP_SOURCE`]
fn if_span() -> String {
    let start = SWAP_SOURCE.find("if (").unwrap();
    let end = SWAP_SOURCE.find("y();").unwrap() + "y();".len();
    format!("{start}..{end}")
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("actions"))
        .stdout(predicate::str::contains("analyze"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));
}

#[test]
fn test_rules_lists_builtin_rules() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("split-if-else"))
        .stdout(predicate::str::contains("replace-any-with-count-or-length"))
        .stdout(predicate::str::contains("remove-comment"));
}

#[test]
fn test_rules_marks_disabled_rules() {
    let dir = TempDir::new().unwrap();
    let config = write_source(
        &dir,
        ".refitrc.json",
        r#"{ "rules": { "disabled": ["remove-comment"] } }"#,
    );
    cli()
        .args(["rules", "--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remove comment (disabled)"));
}

#[test]
fn test_actions_at_span() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args(["actions", file.to_str().unwrap(), "--span", &if_span()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Swap statements in if-else [swap-if-else-statements#0]",
        ));
}

#[test]
fn test_actions_json_format() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args([
            "actions",
            file.to_str().unwrap(),
            "--span",
            &if_span(),
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rule\": \"swap-if-else-statements\""))
        .stdout(predicate::str::contains("\"equivalenceKey\""));
}

#[test]
fn test_apply_prints_rewritten_text() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args([
            "apply",
            file.to_str().unwrap(),
            "--span",
            &if_span(),
            "--rule",
            "swap-if-else-statements",
        ])
        .assert()
        .success()
        .stdout(predicate::eq(
            "class C { void M() { if (a >= b) y(); else x(); } }",
        ));
    assert_eq!(fs::read_to_string(&file).unwrap(), SWAP_SOURCE);
}

#[test]
fn test_apply_write_updates_file() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args([
            "apply",
            file.to_str().unwrap(),
            "--span",
            &if_span(),
            "--rule",
            "swap-if-else-statements",
            "--write",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 'Swap statements in if-else'"));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "class C { void M() { if (a >= b) y(); else x(); } }"
    );
}

#[test]
fn test_apply_unavailable_rule_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args([
            "apply",
            file.to_str().unwrap(),
            "--span",
            &if_span(),
            "--rule",
            "split-if-else",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("index 0 is out of range"));

    cli()
        .args([
            "apply",
            file.to_str().unwrap(),
            "--span",
            &if_span(),
            "--rule",
            "no-such-rule",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule 'no-such-rule'"));
}

#[test]
fn test_span_outside_document_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_source(&dir, "Swap.cs", SWAP_SOURCE);
    cli()
        .args(["actions", file.to_str().unwrap(), "--span", "0..9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is outside of"));
}

#[test]
fn test_analyze_reports_findings() {
    let dir = TempDir::new().unwrap();
    let merge = write_source(&dir, "Merge.cs", MERGE_SOURCE);
    let clean = write_source(&dir, "Clean.cs", "class C { void M() { } }");
    cli()
        .args(["analyze", merge.to_str().unwrap(), clean.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Merge.cs:1:21: info[merge-local-declaration-with-return]",
        ))
        .stdout(predicate::str::contains("Checked 2 file(s): 1 finding(s)"));
}

#[test]
fn test_analyze_respects_config() {
    let dir = TempDir::new().unwrap();
    let merge = write_source(&dir, "Merge.cs", MERGE_SOURCE);
    write_source(
        &dir,
        ".refitrc.toml",
        "[rules]\ndisabled = [\"merge-local-declaration-with-return\"]\n",
    );
    cli()
        .args(["analyze", merge.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no findings"));
}

#[test]
fn test_analyze_json_format() {
    let dir = TempDir::new().unwrap();
    let merge = write_source(&dir, "Merge.cs", MERGE_SOURCE);
    cli()
        .args(["analyze", merge.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"files\""))
        .stdout(predicate::str::contains("\"fadeOut\""));
}

#[test]
fn test_analyze_missing_file_fails() {
    cli()
        .args(["analyze", "does-not-exist.cs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
