use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_DIRECTIVE: &str = "info";

/// Where log lines go for the current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// The terminal belongs to the TUI; only an explicit log file receives output.
    FileOnly,
}

/// `--log` wins outright; otherwise `RUST_LOG` applies on top of the `info` default.
pub fn build_filter(filter: Option<&str>) -> Result<EnvFilter> {
    match filter {
        Some(filter) => EnvFilter::try_new(filter)
            .with_context(|| format!("invalid log filter '{}'", filter)),
        None => {
            let directive: Directive = DEFAULT_LOG_DIRECTIVE.parse()?;
            Ok(EnvFilter::builder()
                .with_default_directive(directive)
                .from_env_lossy())
        }
    }
}

pub fn init_tracing(filter: Option<&str>, log_file: Option<&Path>, sink: LogSink) -> Result<()> {
    let env_filter = build_filter(filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    match (log_file, sink) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        (None, LogSink::Stderr) => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
        (None, LogSink::FileOnly) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_filter_accepts_full_directives() {
        let filter = build_filter(Some("taskrank_core=debug,reqwest=warn")).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("taskrank_core=debug"));
        assert!(rendered.contains("reqwest=warn"));
    }

    #[test]
    fn malformed_filter_is_rejected() {
        let err = build_filter(Some("taskrank=loudest")).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }

    #[test]
    fn log_file_is_created_on_init() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskrank.log");
        init_tracing(Some("debug"), Some(&path), LogSink::FileOnly).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unopenable_log_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("taskrank.log");
        assert!(init_tracing(None, Some(&path), LogSink::Stderr).is_err());
    }
}
