//! Refit CLI
//!
//! Command-line host for the refit rewrite engine

mod commands;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use refit_core::{TextRange, TextSize, init_tracing_with};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "refit")]
#[command(about = "Refit: pattern-match-and-rewrite refactorings over C# source")]
#[command(version = refit_core::VERSION)]
#[command(
    long_about = "Refit lists and applies syntax rewrites at a selection and runs analyzers over source files.\n\
\n\
Examples:\n  \
refit actions Foo.cs --span 120..180      # Rewrites available at a selection\n  \
refit apply Foo.cs --span 120..180 --rule split-if-else --write\n  \
refit analyze src/A.cs src/B.cs           # Analyzer findings\n  \
refit rules                               # List available rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "REFIT_CONFIG",
        help = "Path to configuration file (.refitrc.json/.refitrc.toml)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List the rewrites available at a selection
    Actions {
        /// Source file
        file: PathBuf,

        /// Selection as `start..end` byte offsets, or a single caret offset
        #[arg(long, value_parser = parse_span)]
        span: TextRange,
    },

    /// Apply one of the rewrites available at a selection
    Apply {
        /// Source file
        file: PathBuf,

        /// Selection as `start..end` byte offsets, or a single caret offset
        #[arg(long, value_parser = parse_span)]
        span: TextRange,

        /// Rule whose rewrite to apply
        #[arg(long)]
        rule: String,

        /// Which of the rule's rewrites to apply, in listed order
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Write the result back to the file instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Run the analyzer rules over source files
    Analyze {
        /// Files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List available rules
    Rules,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Parse `start..end` or a single offset
fn parse_span(s: &str) -> std::result::Result<TextRange, String> {
    let offset = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map(TextSize::from)
            .map_err(|e| format!("Invalid offset '{part}': {e}"))
    };
    let (start, end) = match s.split_once("..") {
        Some((start, end)) => (offset(start)?, offset(end)?),
        None => {
            let caret = offset(s)?;
            (caret, caret)
        }
    };
    if start > end {
        return Err(format!("Invalid span '{s}': start is after end"));
    }
    Ok(TextRange::new(start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "refit=warn",
        1 => "refit=info",
        2 => "refit=debug",
        _ => "refit=trace",
    };
    init_tracing_with(log_level, false);

    match run_command(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("refit failed: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let format = cli.format;
    match cli.command {
        Some(Commands::Actions { file, span }) => {
            commands::actions_command(&file, span, format, cli.config.as_deref()).await
        }
        Some(Commands::Apply {
            file,
            span,
            rule,
            index,
            write,
        }) => {
            commands::apply_command(
                &file,
                span,
                &rule,
                index,
                write,
                format,
                cli.config.as_deref(),
            )
            .await
        }
        Some(Commands::Analyze { files }) => {
            commands::analyze_command(&files, format, cli.config.as_deref()).await
        }
        Some(Commands::Rules) => commands::rules_command(format, cli.config.as_deref()),
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
