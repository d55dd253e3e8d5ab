use std::io::Write;

use anyhow::{anyhow, Context, Result};

use crate::cli::{AnalyzeArgs, CliCommand};
use crate::config::AppConfig;
use crate::core::import::read_source;
use crate::core::{
    prepare_snapshot, render, render_suggestions, AnalysisService, HttpAnalysisClient,
    ImportOutcome, Strategy, TaskStore,
};

pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, mut writer: W) -> Result<()> {
    match command {
        CliCommand::Strategies => handle_strategies(config, &mut writer),
        CliCommand::Analyze(args) => {
            let service = HttpAnalysisClient::new(config).context("failed to build HTTP client")?;
            block_on(run_analysis(config, &service, Mode::Analyze, &args, &mut writer))
        }
        CliCommand::Suggest(args) => {
            let service = HttpAnalysisClient::new(config).context("failed to build HTTP client")?;
            block_on(run_analysis(config, &service, Mode::Suggest, &args, &mut writer))
        }
        CliCommand::Tui => Err(anyhow!(
            "the tui command runs interactively, not as a batch command"
        )),
    }
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(future)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Analyze,
    Suggest,
}

pub(crate) async fn run_analysis<W: Write>(
    config: &AppConfig,
    service: &dyn AnalysisService,
    mode: Mode,
    args: &AnalyzeArgs,
    mut writer: W,
) -> Result<()> {
    let raw = read_source(&args.file)?;
    let mut store = TaskStore::new();
    let (snapshot, outcome) = prepare_snapshot(&mut store, &raw)?;
    if let ImportOutcome::Replaced { count, .. } = outcome {
        tracing::info!(count, file = %args.file.display(), "loaded tasks");
    }

    let strategy = args
        .strategy
        .clone()
        .unwrap_or_else(|| config.default_strategy().clone());

    let view = match mode {
        Mode::Analyze => {
            let response = service.analyze(&snapshot, &strategy).await?;
            render(&response, strategy.label())
        }
        Mode::Suggest => {
            let response = service.suggest(&snapshot, &strategy).await?;
            render_suggestions(&response, strategy.label())
        }
    };

    write!(writer, "{}", view)?;
    Ok(())
}

fn handle_strategies<W: Write>(config: &AppConfig, mut writer: W) -> Result<()> {
    let default = config.default_strategy();
    for strategy in Strategy::presets() {
        let marker = if &strategy == default { "*" } else { " " };
        writeln!(writer, "{} {:<10} {}", marker, strategy.as_str(), strategy.label())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result as CoreResult;
    use crate::core::{AnalysisResponse, AnalysisResult, CoreError, SuggestionResponse, Task};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records the strategy of every call and answers with a canned response.
    struct FakeService {
        calls: Mutex<Vec<String>>,
        response: AnalysisResponse,
    }

    #[async_trait]
    impl AnalysisService for FakeService {
        async fn analyze(
            &self,
            _tasks: &[Task],
            strategy: &Strategy,
        ) -> CoreResult<AnalysisResponse> {
            self.calls.lock().unwrap().push(strategy.to_string());
            Ok(self.response.clone())
        }

        async fn suggest(
            &self,
            tasks: &[Task],
            strategy: &Strategy,
        ) -> CoreResult<SuggestionResponse> {
            let response = self.analyze(tasks, strategy).await?;
            Ok(SuggestionResponse {
                has_cycle: response.has_cycle,
                suggestions: response.results.into_iter().take(3).collect(),
            })
        }
    }

    fn fake(score: f64) -> FakeService {
        FakeService {
            calls: Mutex::new(Vec::new()),
            response: AnalysisResponse {
                has_cycle: false,
                results: vec![AnalysisResult {
                    task: Task::new("Write report"),
                    score,
                    explanation: "urgent".into(),
                }],
            },
        }
    }

    fn write_file(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, contents).expect("write tasks");
        path
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime")
    }

    #[test]
    fn analyze_prints_rendered_view() {
        let dir = TempDir::new().expect("temp dir");
        let file = write_file(&dir, r#"[{"id": "1", "title": "Write report"}]"#);
        let args = AnalyzeArgs {
            file,
            strategy: Some(Strategy::new("deadline")),
        };
        let service = fake(82.0);
        let config = AppConfig::for_api_url("http://unused");

        let mut output = Vec::new();
        runtime()
            .block_on(run_analysis(&config, &service, Mode::Analyze, &args, &mut output))
            .expect("analysis");
        let output = String::from_utf8(output).expect("utf8");

        assert!(output.starts_with("Strategy Used: Deadline Driven"));
        assert!(output.contains("[HIGH] Write report (Score: 82)"));
        assert!(output.contains("urgent"));
        assert_eq!(*service.calls.lock().unwrap(), vec!["deadline".to_string()]);
    }

    #[test]
    fn analyze_uses_configured_default_strategy() {
        let dir = TempDir::new().expect("temp dir");
        let file = write_file(&dir, r#"[{"title": "Write report"}]"#);
        let args = AnalyzeArgs {
            file,
            strategy: None,
        };
        let service = fake(10.0);
        let config = AppConfig::for_api_url("http://unused");

        let mut output = Vec::new();
        runtime()
            .block_on(run_analysis(&config, &service, Mode::Suggest, &args, &mut output))
            .expect("suggest");

        assert_eq!(*service.calls.lock().unwrap(), vec!["smart".to_string()]);
        assert!(String::from_utf8(output).unwrap().contains("[LOW]"));
    }

    #[test]
    fn malformed_file_aborts_before_any_call() {
        let dir = TempDir::new().expect("temp dir");
        let file = write_file(&dir, "not json");
        let args = AnalyzeArgs {
            file,
            strategy: None,
        };
        let service = fake(50.0);
        let config = AppConfig::for_api_url("http://unused");

        let err = runtime()
            .block_on(run_analysis(&config, &service, Mode::Analyze, &args, Vec::new()))
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Format(_))
        ));
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_list_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let file = write_file(&dir, "[]");
        let args = AnalyzeArgs {
            file,
            strategy: None,
        };
        let service = fake(50.0);
        let config = AppConfig::for_api_url("http://unused");

        let err = runtime()
            .block_on(run_analysis(&config, &service, Mode::Analyze, &args, Vec::new()))
            .unwrap_err();

        assert_eq!(err.to_string(), "No tasks to analyze");
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn strategies_marks_default() {
        let config = AppConfig::for_api_url("http://unused");
        let mut output = Vec::new();
        execute(&config, CliCommand::Strategies, &mut output).expect("strategies");
        let output = String::from_utf8(output).expect("utf8");

        assert!(output.contains("* smart"));
        assert!(output.contains("  deadline"));
        assert_eq!(output.lines().count(), 4);
    }

    #[test]
    fn tui_is_not_a_batch_command() {
        let config = AppConfig::for_api_url("http://unused");
        assert!(execute(&config, CliCommand::Tui, Vec::new()).is_err());
    }
}
