//! Analyzer diagnostics

use biome_text_size::{TextRange, TextSize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// A finding reported by an analyzer rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Span the finding is reported on
    pub range: TextRange,
    /// Spans a client may render faded out, as code that would disappear
    pub fade_out: Vec<TextRange>,
}

impl Diagnostic {
    pub fn new(rule_id: impl Into<String>, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity: Severity::Info,
            message: message.into(),
            range,
            fade_out: Vec::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_fade_out(mut self, ranges: impl IntoIterator<Item = TextRange>) -> Self {
        self.fade_out.extend(ranges);
        self
    }

    /// 1-based line and column of the start of the range
    pub fn location(&self, text: &str) -> Location {
        Location::of(text, self.range.start())
    }
}

/// Line and column of an offset, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn of(text: &str, offset: TextSize) -> Self {
        let offset = usize::from(offset).min(text.len());
        let before = text.get(..offset).unwrap_or(text);
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Receives diagnostics as analyzers produce them
pub trait DiagnosticSink: Send {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Collecting sink with ordering and grouping helpers
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Sort by position, then rule id
    pub fn sort_by_location(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.range
                .start()
                .cmp(&b.range.start())
                .then_with(|| a.range.end().cmp(&b.range.end()))
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
    }

    /// Drop repeated reports of one rule on one range
    pub fn deduplicate(&mut self) {
        self.sort_by_location();
        self.diagnostics
            .dedup_by(|a, b| a.rule_id == b.rule_id && a.range == b.range);
    }

    pub fn group_by_rule(&self) -> BTreeMap<&str, Vec<&Diagnostic>> {
        let mut groups: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            groups
                .entry(diagnostic.rule_id.as_str())
                .or_default()
                .push(diagnostic);
        }
        groups
    }

    pub fn count_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(rule = %diagnostic.rule_id, range = ?diagnostic.range, "Diagnostic reported");
        self.diagnostics.push(diagnostic);
    }
}
