use anyhow::Result;
use clap::Parser;

use taskrank::cli::{Cli, CliCommand};
use taskrank::logging::{self, LogSink};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let sink = match cli.command {
        Some(CliCommand::Tui) | None => LogSink::FileOnly,
        Some(_) => LogSink::Stderr,
    };
    logging::init_tracing(cli.log_filter.as_deref(), cli.log_file.as_deref(), sink)?;

    let config = taskrank::config::from_cli(&cli)?;
    tracing::debug!(
        api = config.api_base_url(),
        strategy = config.default_strategy().as_str(),
        "configuration resolved"
    );

    match cli.command.clone() {
        Some(CliCommand::Tui) | None => {
            taskrank::tui::run(config)?;
        }
        Some(command) => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            taskrank::commands::execute(&config, command, &mut handle)?;
        }
    }

    Ok(())
}
