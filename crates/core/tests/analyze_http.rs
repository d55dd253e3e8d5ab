use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskrank_core::analyze::{ANALYZE_PATH, SUGGEST_PATH};
use taskrank_core::render::CYCLE_WARNING;
use taskrank_core::{
    add_task, prepare_snapshot, render, render_suggestions, AnalysisService, CoreError,
    HttpAnalysisClient, PriorityTier, ServiceError, Strategy, Task, TaskInput, TaskStore,
};

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn respond(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    stub.seen.lock().unwrap().push(body);
    (
        stub.status,
        [("content-type", "application/json")],
        stub.body.clone(),
    )
        .into_response()
}

async fn serve(status: StatusCode, body: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    serve_raw(status, body.to_string()).await
}

async fn serve_raw(status: StatusCode, body: String) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body,
        seen: seen.clone(),
    };
    let app = Router::new()
        .route(ANALYZE_PATH, post(respond))
        .route(SUGGEST_PATH, post(respond))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

fn write_report_store() -> TaskStore {
    let mut store = TaskStore::new();
    let mut input = TaskInput::with_title("Write report");
    input.estimated_hours = "2".into();
    input.importance = "8".into();
    add_task(&mut store, &input).unwrap();
    store
}

#[tokio::test]
async fn analyze_renders_single_high_priority_result() {
    let mut store = write_report_store();
    let submitted = store.tasks()[0].clone();
    let (url, seen) = serve(
        StatusCode::OK,
        json!({
            "has_cycle": false,
            "results": [{
                "task": {
                    "id": submitted.id,
                    "title": "Write report",
                    "due_date": null,
                    "estimated_hours": 2,
                    "importance": 8,
                    "dependencies": []
                },
                "score": 82,
                "explanation": "urgent"
            }]
        }),
    )
    .await;

    let client = HttpAnalysisClient::with_base_url(url);
    let strategy = Strategy::new("deadline");
    let (snapshot, _) = prepare_snapshot(&mut store, "").unwrap();
    let response = client.analyze(&snapshot, &strategy).await.unwrap();
    let view = render(&response, strategy.label());

    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.entries[0].tier, PriorityTier::High);
    assert_eq!(view.entries[0].explanation, "urgent");
    assert_eq!(view.cycle_warning, None);
    assert!(!view.to_string().contains(CYCLE_WARNING));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["strategy"], "deadline");
    assert_eq!(requests[0]["tasks"][0]["title"], "Write report");
    assert_eq!(requests[0]["tasks"][0]["estimated_hours"], 2.0);
    assert_eq!(requests[0]["tasks"][0]["importance"], 8);
    assert_eq!(requests[0]["tasks"][0]["due_date"], Value::Null);
    assert_eq!(requests[0]["tasks"][0]["dependencies"], json!([]));
    // the store is never touched by the call
    assert_eq!(store.len(), 1);
    assert_eq!(store.revision(), 1);
}

#[tokio::test]
async fn cycle_warning_is_rendered_first() {
    let (url, _) = serve(
        StatusCode::OK,
        json!({
            "has_cycle": true,
            "results": [
                {"task": {"id": "a", "title": "A", "dependencies": ["b"]}, "score": 40, "explanation": "x"},
                {"task": {"id": "b", "title": "B", "dependencies": ["a"]}, "score": 60, "explanation": "y"}
            ]
        }),
    )
    .await;

    let client = HttpAnalysisClient::with_base_url(url);
    let tasks = vec![Task::new("A"), Task::new("B")];
    let response = client.analyze(&tasks, &Strategy::default()).await.unwrap();
    let text = render(&response, "Smart Balance").to_string();

    let warning_at = text.find(CYCLE_WARNING).unwrap();
    assert!(warning_at < text.find("] A").unwrap());
    assert!(warning_at < text.find("] B").unwrap());
}

#[tokio::test]
async fn non_success_status_is_a_server_error() {
    let (url, _) = serve(
        StatusCode::BAD_REQUEST,
        json!({"validation_errors": [{"index": 0, "errors": {"title": ["required"]}}]}),
    )
    .await;

    let client = HttpAnalysisClient::with_base_url(url);
    let err = client
        .analyze(&[Task::new("x")], &Strategy::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Service(ServiceError::Status(StatusCode::BAD_REQUEST))
    ));
    assert_eq!(err.to_string(), "Analysis failed: Server error");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (url, _) = serve_raw(StatusCode::OK, "{\"results\": 12".to_string()).await;

    let client = HttpAnalysisClient::with_base_url(url);
    let err = client
        .analyze(&[Task::new("x")], &Strategy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Service(ServiceError::Decode(_))));
    assert!(err.to_string().starts_with("Analysis failed:"));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpAnalysisClient::with_base_url(format!("http://{}", addr));
    let err = client
        .analyze(&[Task::new("x")], &Strategy::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Service(ServiceError::Transport(_))));
}

#[tokio::test]
async fn empty_input_never_reaches_the_service() {
    let (url, seen) = serve(StatusCode::OK, json!({"has_cycle": false, "results": []})).await;

    let client = HttpAnalysisClient::with_base_url(url);
    let err = client.analyze(&[], &Strategy::default()).await.unwrap_err();

    assert!(matches!(err, CoreError::EmptyInput));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn suggest_posts_to_suggest_endpoint() {
    let (url, seen) = serve(
        StatusCode::OK,
        json!({
            "has_cycle": false,
            "suggestions": [
                {"task": {"id": "1", "title": "First"}, "score": 91.5, "explanation": "top"}
            ]
        }),
    )
    .await;

    let client = HttpAnalysisClient::with_base_url(url);
    let response = client
        .suggest(&[Task::new("First"), Task::new("Second")], &Strategy::new("impact"))
        .await
        .unwrap();
    let view = render_suggestions(&response, "High Impact");

    assert_eq!(view.entries.len(), 1);
    assert_eq!(view.entries[0].title, "First");
    assert_eq!(seen.lock().unwrap()[0]["strategy"], "impact");
}
