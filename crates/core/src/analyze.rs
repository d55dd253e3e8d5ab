//! Client for the external task analysis service.
//!
//! The service owns scoring and cycle detection; this module only honors its
//! request/response contract. Calls operate on a snapshot of the task list and
//! never touch the [`TaskStore`](crate::store::TaskStore).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::error::{CoreError, Result, ServiceError};
use crate::import::{import_tasks, ImportOutcome};
use crate::model::{AnalysisResponse, AnalyzeRequest, Strategy, SuggestionResponse, Task};
use crate::store::TaskStore;

pub const ANALYZE_PATH: &str = "/api/tasks/analyze/";
pub const SUGGEST_PATH: &str = "/api/tasks/suggest/";

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, tasks: &[Task], strategy: &Strategy) -> Result<AnalysisResponse>;

    async fn suggest(&self, tasks: &[Task], strategy: &Strategy) -> Result<SuggestionResponse>;
}

/// [`AnalysisService`] backed by HTTP POSTs to the analysis service.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    base_url: String,
}

impl HttpAnalysisClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ServiceError::Transport)?;
        Ok(Self {
            client,
            base_url: config.api_base_url().to_string(),
        })
    }

    pub fn with_base_url<T: Into<String>>(base_url: T) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        tasks: &[Task],
        strategy: &Strategy,
    ) -> Result<T> {
        if tasks.is_empty() {
            return Err(CoreError::EmptyInput);
        }

        let url = self.endpoint(path);
        let body = AnalyzeRequest { tasks, strategy };
        tracing::debug!(%url, count = tasks.len(), %strategy, "sending analysis request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = text.as_str(), "analysis service rejected request");
            return Err(ServiceError::Status(status).into());
        }

        let parsed = response.json::<T>().await.map_err(ServiceError::Decode)?;
        tracing::debug!(%status, "analysis response decoded");
        Ok(parsed)
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, tasks: &[Task], strategy: &Strategy) -> Result<AnalysisResponse> {
        self.post(ANALYZE_PATH, tasks, strategy).await
    }

    async fn suggest(&self, tasks: &[Task], strategy: &Strategy) -> Result<SuggestionResponse> {
        self.post(SUGGEST_PATH, tasks, strategy).await
    }
}

/// First half of the analyze action: apply pending import text, then snapshot the store.
///
/// A malformed import aborts before anything is snapshotted and leaves the store as it
/// was; an empty store fails with [`CoreError::EmptyInput`].
pub fn prepare_snapshot(
    store: &mut TaskStore,
    import_text: &str,
) -> Result<(Vec<Task>, ImportOutcome)> {
    let outcome = import_tasks(store, import_text)?;
    if store.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    Ok((store.snapshot(), outcome))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Analyze,
    Suggest,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Analyze => "analyze",
            AnalysisKind::Suggest => "suggest",
        }
    }
}

/// Finished analysis together with the strategy it was requested with.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub sequence: u64,
    pub kind: AnalysisKind,
    pub strategy: Strategy,
    pub result: Result<AnalysisResponse>,
}

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Handle to an in-flight analysis.
///
/// Dropping the handle does not cancel the request; call [`PendingAnalysis::cancel`].
pub struct PendingAnalysis {
    sequence: u64,
    kind: AnalysisKind,
    strategy: Strategy,
    token: CancellationToken,
    receiver: oneshot::Receiver<AnalysisOutcome>,
    task: JoinHandle<()>,
}

impl PendingAnalysis {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Non-blocking poll; returns the outcome once the request has resolved.
    pub fn try_take(&mut self) -> Option<AnalysisOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(self.lost_outcome()),
        }
    }

    pub async fn wait(self) -> AnalysisOutcome {
        let Self {
            sequence,
            kind,
            strategy,
            receiver,
            ..
        } = self;
        receiver
            .await
            .unwrap_or_else(|_| lost_outcome(sequence, kind, strategy))
    }

    fn lost_outcome(&self) -> AnalysisOutcome {
        lost_outcome(self.sequence, self.kind, self.strategy.clone())
    }
}

fn lost_outcome(sequence: u64, kind: AnalysisKind, strategy: Strategy) -> AnalysisOutcome {
    AnalysisOutcome {
        sequence,
        kind,
        strategy,
        result: Err(ServiceError::Join("analysis task ended without a result".into()).into()),
    }
}

/// Run an analysis on `runtime` against a snapshot of the tasks.
///
/// Empty snapshots still spawn so callers observe [`CoreError::EmptyInput`] through the
/// same channel; no request is issued for them.
pub fn spawn_analysis(
    runtime: &tokio::runtime::Handle,
    service: Arc<dyn AnalysisService>,
    kind: AnalysisKind,
    snapshot: Vec<Task>,
    strategy: Strategy,
) -> PendingAnalysis {
    let sequence = NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let token = CancellationToken::new();
    let (sender, receiver) = oneshot::channel();
    let child = token.clone();
    let requested = strategy.clone();

    tracing::info!(
        sequence,
        kind = kind.as_str(),
        count = snapshot.len(),
        strategy = strategy.as_str(),
        "analysis started"
    );

    let task = runtime.spawn(async move {
        let call = async {
            match kind {
                AnalysisKind::Analyze => service.analyze(&snapshot, &strategy).await,
                AnalysisKind::Suggest => service
                    .suggest(&snapshot, &strategy)
                    .await
                    .map(AnalysisResponse::from),
            }
        };
        let result = tokio::select! {
            _ = child.cancelled() => Err(CoreError::Service(ServiceError::Cancelled)),
            result = call => result,
        };
        if let Err(err) = &result {
            tracing::debug!(sequence, error = %err, "analysis finished with error");
        }
        let _ = sender.send(AnalysisOutcome {
            sequence,
            kind,
            strategy,
            result,
        });
    });

    PendingAnalysis {
        sequence,
        kind,
        strategy: requested,
        token,
        receiver,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnalysisResult;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingService {
        calls: AtomicUsize,
        delay: Duration,
    }

    impl CountingService {
        fn new(delay: Duration) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay,
            }
        }
    }

    #[async_trait]
    impl AnalysisService for CountingService {
        async fn analyze(&self, tasks: &[Task], _strategy: &Strategy) -> Result<AnalysisResponse> {
            if tasks.is_empty() {
                return Err(CoreError::EmptyInput);
            }
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(AnalysisResponse {
                has_cycle: false,
                results: tasks
                    .iter()
                    .map(|task| AnalysisResult {
                        task: task.clone(),
                        score: 60.0,
                        explanation: "ok".into(),
                    })
                    .collect(),
            })
        }

        async fn suggest(&self, tasks: &[Task], strategy: &Strategy) -> Result<SuggestionResponse> {
            let response = self.analyze(tasks, strategy).await?;
            Ok(SuggestionResponse {
                has_cycle: response.has_cycle,
                suggestions: response.results.into_iter().take(3).collect(),
            })
        }
    }

    #[tokio::test]
    async fn http_client_rejects_empty_input_before_sending() {
        // Port 9 (discard) is never contacted: the empty check comes first.
        let client = HttpAnalysisClient::with_base_url("http://127.0.0.1:9/");
        let err = client.analyze(&[], &Strategy::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));
        let err = client.suggest(&[], &Strategy::default()).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));
    }

    #[test]
    fn prepare_snapshot_aborts_on_malformed_import() {
        let mut store = TaskStore::with_tasks(vec![Task::new("keep me")]);
        let err = prepare_snapshot(&mut store, "not json").unwrap_err();
        assert!(matches!(err, CoreError::Format(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title, "keep me");
    }

    #[test]
    fn prepare_snapshot_requires_tasks() {
        let mut store = TaskStore::new();
        let err = prepare_snapshot(&mut store, "  ").unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));

        let err = prepare_snapshot(&mut store, "[]").unwrap_err();
        assert!(matches!(err, CoreError::EmptyInput));
    }

    #[test]
    fn prepare_snapshot_prefers_imported_tasks() {
        let mut store = TaskStore::with_tasks(vec![Task::new("old")]);
        let (snapshot, outcome) =
            prepare_snapshot(&mut store, r#"[{"id": "9", "title": "new"}]"#).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "new");
        assert!(matches!(outcome, ImportOutcome::Replaced { count: 1, .. }));
        assert_eq!(store.tasks(), snapshot.as_slice());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = HttpAnalysisClient::with_base_url("http://127.0.0.1:8000//");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(
            client.endpoint(ANALYZE_PATH),
            "http://127.0.0.1:8000/api/tasks/analyze/"
        );
    }

    #[tokio::test]
    async fn spawned_analysis_uses_snapshot_taken_at_call_time() {
        let service = Arc::new(CountingService::new(Duration::from_millis(10)));
        let mut tasks = vec![Task::new("first")];
        let pending = spawn_analysis(
            &tokio::runtime::Handle::current(),
            service.clone(),
            AnalysisKind::Analyze,
            tasks.clone(),
            Strategy::new("deadline"),
        );
        tasks.push(Task::new("added while pending"));

        let outcome = pending.wait().await;
        let response = outcome.result.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(outcome.strategy.as_str(), "deadline");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_analysis_reports_cancellation() {
        let service = Arc::new(CountingService::new(Duration::from_secs(30)));
        let pending = spawn_analysis(
            &tokio::runtime::Handle::current(),
            service,
            AnalysisKind::Analyze,
            vec![Task::new("slow")],
            Strategy::default(),
        );
        pending.cancel();
        assert!(pending.is_cancelled());

        let outcome = pending.wait().await;
        assert!(matches!(
            outcome.result,
            Err(CoreError::Service(ServiceError::Cancelled))
        ));
    }

    #[tokio::test]
    async fn suggest_outcome_is_flattened_into_response() {
        let service = Arc::new(CountingService::new(Duration::ZERO));
        let tasks = (0..5).map(|i| Task::new(format!("t{i}"))).collect();
        let pending = spawn_analysis(
            &tokio::runtime::Handle::current(),
            service,
            AnalysisKind::Suggest,
            tasks,
            Strategy::default(),
        );
        let outcome = pending.wait().await;
        assert_eq!(outcome.kind, AnalysisKind::Suggest);
        assert_eq!(outcome.result.unwrap().results.len(), 3);
    }

    struct PanickingService;

    #[async_trait]
    impl AnalysisService for PanickingService {
        async fn analyze(&self, _tasks: &[Task], _strategy: &Strategy) -> Result<AnalysisResponse> {
            panic!("service crashed");
        }

        async fn suggest(&self, _tasks: &[Task], _strategy: &Strategy) -> Result<SuggestionResponse> {
            panic!("service crashed");
        }
    }

    #[tokio::test]
    async fn lost_analysis_keeps_requested_strategy() {
        let pending = spawn_analysis(
            &tokio::runtime::Handle::current(),
            Arc::new(PanickingService),
            AnalysisKind::Analyze,
            vec![Task::new("doomed")],
            Strategy::new("impact"),
        );
        assert_eq!(pending.strategy().as_str(), "impact");

        let outcome = pending.wait().await;
        assert_eq!(outcome.strategy.as_str(), "impact");
        assert!(matches!(
            outcome.result,
            Err(CoreError::Service(ServiceError::Join(_)))
        ));
    }

    #[tokio::test]
    async fn sequences_increase_per_request() {
        let service: Arc<dyn AnalysisService> = Arc::new(CountingService::new(Duration::ZERO));
        let handle = tokio::runtime::Handle::current();
        let first = spawn_analysis(
            &handle,
            service.clone(),
            AnalysisKind::Analyze,
            vec![Task::new("a")],
            Strategy::default(),
        );
        let second = spawn_analysis(
            &handle,
            service,
            AnalysisKind::Analyze,
            vec![Task::new("b")],
            Strategy::default(),
        );
        assert!(second.sequence() > first.sequence());
    }
}
