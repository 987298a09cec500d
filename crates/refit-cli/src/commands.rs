//! Command implementations

use crate::OutputFormat;
use crate::output;
use anyhow::{Context, Result, anyhow, bail};
use refit_core::{
    CancellationToken, ConfigLoader, DiagnosticCollector, DiagnosticSink, FixtureProvider,
    RefitConfig, SyntaxTree, TextRange, parse,
};
use refit_rules::{CodeActionRequest, Dispatcher, RuleRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// A parsed source file
struct Document {
    path: PathBuf,
    tree: SyntaxTree,
}

impl Document {
    fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let tree = parse(&text).with_context(|| format!("Failed to parse '{}'", path.display()))?;
        debug!(file = %path.display(), bytes = text.len(), "Parsed document");
        Ok(Self {
            path: path.to_path_buf(),
            tree,
        })
    }
}

/// Load the configuration, searching upward from `near` when no path is given
fn load_config(config: Option<&Path>, near: Option<&Path>) -> Result<RefitConfig> {
    let start = near
        .and_then(Path::parent)
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(ConfigLoader::load(config, Some(start))?)
}

/// The process-wide registry of built-in rules, installed on first use
fn registry() -> Result<Arc<RuleRegistry>> {
    match refit_rules::global() {
        Some(registry) => Ok(registry),
        None => Ok(refit_rules::install_builtin_rules()?),
    }
}

fn dispatcher(config: &RefitConfig) -> Result<Dispatcher> {
    Ok(
        Dispatcher::new(registry()?, Arc::new(FixtureProvider::new()))
            .with_default_newline(config.newline()),
    )
}

/// Token cancelled when the user interrupts the process
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}

fn check_span(document: &Document, span: TextRange) -> Result<()> {
    let full = document.tree.full_span();
    if !full.contains_range(span) {
        bail!(
            "Span {}..{} is outside of '{}' (length {})",
            u32::from(span.start()),
            u32::from(span.end()),
            document.path.display(),
            u32::from(full.end())
        );
    }
    Ok(())
}

pub async fn actions_command(
    file: &Path,
    span: TextRange,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config, Some(file))?;
    let document = Document::load(file)?;
    check_span(&document, span)?;

    let dispatcher = dispatcher(&config)?;
    let request =
        CodeActionRequest::new(document.tree.clone(), span).with_cancel(cancel_on_interrupt());
    let actions = dispatcher
        .code_actions(&request, &config.rules_config())
        .await?;
    dispatcher.release(&document.tree);
    info!(count = actions.len(), "Code actions computed");

    output::print_actions(&actions, format)
}

pub async fn apply_command(
    file: &Path,
    span: TextRange,
    rule: &str,
    index: usize,
    write: bool,
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config, Some(file))?;
    let document = Document::load(file)?;
    check_span(&document, span)?;

    let dispatcher = dispatcher(&config)?;
    if !dispatcher.registry().contains(rule) {
        bail!("Unknown rule '{rule}'");
    }
    let cancel = cancel_on_interrupt();
    let request = CodeActionRequest::new(document.tree.clone(), span).with_cancel(cancel.clone());
    let actions = dispatcher
        .code_actions(&request, &config.rules_config())
        .await?;

    let candidates: Vec<_> = actions.iter().filter(|a| a.rule_id == rule).collect();
    let action = candidates.get(index).ok_or_else(|| {
        anyhow!(
            "Rule '{rule}' offers {} rewrite(s) at this span; index {index} is out of range",
            candidates.len()
        )
    })?;
    let applied = action.apply(&cancel);
    dispatcher.release(&document.tree);
    let Some(rewritten) = applied? else {
        bail!("'{}' no longer applies", action.title);
    };
    info!(rule, title = %action.title, "Applied rewrite");

    if write {
        fs::write(file, rewritten.text())
            .with_context(|| format!("Failed to write '{}'", file.display()))?;
    }
    output::print_applied(action, &rewritten, file, write, format)
}

pub async fn analyze_command(
    files: &[PathBuf],
    format: OutputFormat,
    config: Option<&Path>,
) -> Result<()> {
    let config = load_config(config, files.first().map(PathBuf::as_path))?;
    let documents = files
        .iter()
        .map(|path| Document::load(path))
        .collect::<Result<Vec<_>>>()?;

    let dispatcher = Arc::new(dispatcher(&config)?);
    let filter = config.rules_config();
    let cancel = cancel_on_interrupt();
    let trees: Vec<SyntaxTree> = documents.iter().map(|d| d.tree.clone()).collect();

    let results = tokio::task::spawn_blocking({
        let dispatcher = Arc::clone(&dispatcher);
        move || dispatcher.analyze_batch(&trees, &filter, &cancel)
    })
    .await?;

    let mut reports = Vec::with_capacity(documents.len());
    for (document, result) in documents.iter().zip(results) {
        let mut collector = DiagnosticCollector::new();
        for diagnostic in result? {
            collector.report(diagnostic);
        }
        collector.sort_by_location();
        collector.deduplicate();
        reports.push(output::FileReport {
            path: &document.path,
            text: document.tree.text(),
            diagnostics: collector.into_diagnostics(),
        });
    }

    output::print_diagnostics(&reports, format)
}

pub fn rules_command(format: OutputFormat, config: Option<&Path>) -> Result<()> {
    let config = load_config(config, None)?;
    let registry = registry()?;
    output::print_rules(&registry, &config.rules_config(), format)
}
