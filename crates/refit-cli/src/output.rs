//! Output formatting
//!
//! Human output goes to stdout one line per item; JSON output is a single
//! pretty-printed document.

use crate::OutputFormat;
use anyhow::Result;
use refit_core::{Diagnostic, Location, RuleFilter, Severity, SyntaxTree};
use refit_rules::{CodeAction, RuleRegistry};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

/// Diagnostics of one analyzed file
pub struct FileReport<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    pub diagnostics: Vec<Diagnostic>,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn span_json(text: &str, range: refit_core::TextRange) -> serde_json::Value {
    let Location { line, column } = Location::of(text, range.start());
    json!({
        "start": u32::from(range.start()),
        "end": u32::from(range.end()),
        "line": line,
        "column": column,
    })
}

pub fn print_actions(actions: &[CodeAction], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            if actions.is_empty() {
                println!("No rewrites available");
            }
            // index is per rule, matching `apply --index`
            let mut per_rule: BTreeMap<&str, usize> = BTreeMap::new();
            for action in actions {
                let index = per_rule.entry(action.rule_id.as_str()).or_default();
                println!("{} [{}#{}]", action.title, action.rule_id, index);
                *index += 1;
            }
            Ok(())
        }
        OutputFormat::Json => {
            let mut per_rule: BTreeMap<&str, usize> = BTreeMap::new();
            let items: Vec<_> = actions
                .iter()
                .map(|action| {
                    let index = per_rule.entry(action.rule_id.as_str()).or_default();
                    let item = json!({
                        "rule": action.rule_id,
                        "index": *index,
                        "title": action.title,
                        "equivalenceKey": action.equivalence_key,
                    });
                    *index += 1;
                    item
                })
                .collect();
            print_json(&items)
        }
    }
}

pub fn print_applied(
    action: &CodeAction,
    rewritten: &SyntaxTree,
    file: &Path,
    written: bool,
    format: OutputFormat,
) -> Result<()> {
    match (format, written) {
        (OutputFormat::Human, true) => {
            println!("Applied '{}' to {}", action.title, file.display());
            Ok(())
        }
        (OutputFormat::Human, false) => {
            print!("{}", rewritten.text());
            Ok(())
        }
        (OutputFormat::Json, _) => print_json(&json!({
            "file": file.display().to_string(),
            "rule": action.rule_id,
            "title": action.title,
            "written": written,
            "text": rewritten.text(),
        })),
    }
}

pub fn print_diagnostics(reports: &[FileReport<'_>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            let mut total = 0;
            let mut counts: BTreeMap<Severity, usize> = BTreeMap::new();
            for report in reports {
                for diagnostic in &report.diagnostics {
                    println!(
                        "{}:{}: {}[{}]: {}",
                        report.path.display(),
                        diagnostic.location(report.text),
                        diagnostic.severity,
                        diagnostic.rule_id,
                        diagnostic.message
                    );
                    *counts.entry(diagnostic.severity).or_default() += 1;
                    total += 1;
                }
            }
            let breakdown: Vec<String> = counts
                .iter()
                .rev()
                .map(|(severity, count)| format!("{count} {severity}"))
                .collect();
            if breakdown.is_empty() {
                println!("Checked {} file(s): no findings", reports.len());
            } else {
                println!(
                    "Checked {} file(s): {total} finding(s) ({})",
                    reports.len(),
                    breakdown.join(", ")
                );
            }
            Ok(())
        }
        OutputFormat::Json => {
            let files: Vec<_> = reports
                .iter()
                .map(|report| {
                    let diagnostics: Vec<_> = report
                        .diagnostics
                        .iter()
                        .map(|d| {
                            json!({
                                "rule": d.rule_id,
                                "severity": d.severity,
                                "message": d.message,
                                "range": span_json(report.text, d.range),
                                "fadeOut": d.fade_out.iter().map(|r| span_json(report.text, *r)).collect::<Vec<_>>(),
                            })
                        })
                        .collect();
                    json!({
                        "file": report.path.display().to_string(),
                        "diagnostics": diagnostics,
                    })
                })
                .collect();
            print_json(&json!({ "files": files }))
        }
    }
}

pub fn print_rules(
    registry: &RuleRegistry,
    filter: &dyn RuleFilter,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Human => {
            for metadata in registry.metadata() {
                let kind = if metadata.analyzer { "analyzer" } else { "refactoring" };
                let state = if filter.is_enabled(&metadata.id) { "" } else { " (disabled)" };
                println!(
                    "{:<40} {:<14} {:<11} {}{state}",
                    metadata.id,
                    metadata.category.to_string(),
                    kind,
                    metadata.name
                );
            }
            Ok(())
        }
        OutputFormat::Json => {
            let rules: Vec<_> = registry
                .metadata()
                .map(|metadata| {
                    json!({
                        "metadata": metadata,
                        "enabled": filter.is_enabled(&metadata.id),
                    })
                })
                .collect();
            print_json(&rules)
        }
    }
}
