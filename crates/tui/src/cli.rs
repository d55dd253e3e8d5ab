use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::Strategy;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskrank",
    version,
    about = "Build a task list and rank it with a task analysis service.",
    after_help = "Examples:\n  taskrank                 Launch the TUI (same as `taskrank tui`)\n  taskrank analyze --file tasks.json --strategy deadline\n  cat tasks.json | taskrank suggest --file -\n  taskrank --api-url http://10.0.0.5:8000 tui"
)]
pub struct Cli {
    /// Base URL of the analysis service (defaults to TASKRANK_API_URL, settings file, then http://127.0.0.1:8000)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Override the tracing filter (e.g. "info", "debug", or full directives)
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    /// Write logs to this file (the TUI only logs when this is set)
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the keyboard-first terminal editor (default command)
    Tui,
    /// Import a JSON task list and print the full prioritized analysis
    Analyze(AnalyzeArgs),
    /// Import a JSON task list and print the service's top three suggestions
    Suggest(AnalyzeArgs),
    /// List the known prioritization strategies
    Strategies,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// JSON array of tasks to analyze (`-` reads stdin)
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: PathBuf,

    /// Strategy forwarded to the service (smart, fastest, impact, deadline)
    #[arg(long, short = 's', value_name = "NAME")]
    pub strategy: Option<Strategy>,
}
