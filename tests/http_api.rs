//! End-to-end: `HttpMonitorApi` + `MonitorClient` against an in-process stub
//! of the monitor REST API.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use monitor_client::api::http::HttpMonitorApi;
use monitor_client::api::{ApiError, MonitorApi, MonitorId};
use monitor_client::client::{DeleteOutcome, MonitorClient, MonitorFields, SubmitOutcome};
use monitor_client::config::{ClientConfig, RequestTimeouts};
use monitor_client::identity::UserKey;
use monitor_client::terminal::{TerminalPrompt, TerminalView};
use monitor_client::view::{EMPTY_MESSAGE, LOAD_ERROR_MESSAGE, ListView};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// =========================================================================
// Stub API
// =========================================================================

#[derive(Clone, Default)]
struct StubState {
    monitors: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<u64>>,
}

async fn list_monitors(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let key = params.get("user_key").ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let data: Vec<Value> = state
        .monitors
        .lock()
        .unwrap()
        .iter()
        .filter(|m| m["user_key"] == key.as_str())
        .cloned()
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn create_monitor(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let url = body["url"].as_str().unwrap_or_default();
    if !url.starts_with("http") {
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "bad url" })));
    }

    let id = {
        let mut next = state.next_id.lock().unwrap();
        *next += 1;
        *next
    };
    let mut record = body.clone();
    record["id"] = json!(id);
    state.monitors.lock().unwrap().push(record);
    (StatusCode::CREATED, Json(json!({ "id": id, "message": "monitor created" })))
}

async fn delete_monitor(
    State(state): State<StubState>,
    Path(id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let Some(key) = params.get("user_key") else {
        return StatusCode::UNPROCESSABLE_ENTITY;
    };
    let mut monitors = state.monitors.lock().unwrap();
    let before = monitors.len();
    monitors.retain(|m| !(m["id"] == id && m["user_key"] == key.as_str()));
    if monitors.len() == before { StatusCode::NOT_FOUND } else { StatusCode::NO_CONTENT }
}

async fn spawn_stub() -> (String, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/monitors", get(list_monitors).post(create_monitor))
        .route("/monitors/{id}", delete(delete_monitor))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), state)
}

// =========================================================================
// Helpers
// =========================================================================

type Prompt = TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>>;
type Client = MonitorClient<HttpMonitorApi, TerminalView, Prompt>;

fn http_api(base_url: &str) -> HttpMonitorApi {
    let config = ClientConfig {
        api_url: base_url.to_owned(),
        storage_path: None,
        timeouts: RequestTimeouts { request_secs: Some(5), connect_secs: 2 },
    };
    HttpMonitorApi::new(&config).unwrap()
}

fn client(base_url: &str, user_key: &str, answers: &str) -> Client {
    let prompt = TerminalPrompt::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new(), false);
    MonitorClient::new(http_api(base_url), UserKey::from(user_key), TerminalView::default(), prompt)
}

fn prompt_output(client: &Client) -> String {
    String::from_utf8(client.prompt().output().clone()).unwrap()
}

fn fields(url: &str) -> MonitorFields {
    MonitorFields { url: url.to_owned(), css_selector: ".price".to_owned(), user_email: "me@example.test".to_owned() }
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn add_list_delete_round_trip() {
    let (base_url, state) = spawn_stub().await;
    let mut c = client(&base_url, "key-a", "y\n");

    c.startup().await;
    assert_eq!(c.view().list(), &ListView::Empty);
    assert_eq!(c.view().render_text(), format!("{EMPTY_MESSAGE}\n"));

    let outcome = c.handle_form_submit(fields("https://shop.test/item")).await;
    assert_eq!(outcome, SubmitOutcome::Created(MonitorId::from("1")));
    let cards = c.view().list().cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].element_id, "monitor-1");
    assert_eq!(cards[0].url, "https://shop.test/item");

    let stored = state.monitors.lock().unwrap().clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["user_key"], "key-a");
    assert_eq!(stored[0]["css_selector"], ".price");

    // A fresh load sees the same set the client built locally.
    c.load_monitors().await;
    assert_eq!(c.view().list().cards().len(), 1);

    let outcome = c.handle_delete(&MonitorId::from("1")).await;
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert_eq!(c.view().list(), &ListView::Empty);
    assert!(state.monitors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn list_is_scoped_to_user_key() {
    let (base_url, _state) = spawn_stub().await;

    let mut owner = client(&base_url, "key-a", "");
    owner.startup().await;
    owner.handle_form_submit(fields("https://a.test")).await;

    let mut stranger = client(&base_url, "key-b", "");
    stranger.startup().await;
    assert_eq!(stranger.view().list(), &ListView::Empty);

    let mut again = client(&base_url, "key-a", "");
    again.startup().await;
    assert_eq!(again.view().list().cards().len(), 1);
}

#[tokio::test]
async fn rejected_create_reports_api_detail() {
    let (base_url, state) = spawn_stub().await;
    let mut c = client(&base_url, "key-a", "");
    c.startup().await;

    let outcome = c.handle_form_submit(fields("not-a-url")).await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(prompt_output(&c), "Error: Could not add monitor. bad url\n");
    assert_eq!(c.view().list(), &ListView::Empty);
    assert_eq!(c.view().submit_state().label(), "Start Monitoring");
    assert!(state.monitors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_another_users_monitor_fails_and_keeps_card() {
    let (base_url, _state) = spawn_stub().await;
    let mut owner = client(&base_url, "key-a", "");
    owner.startup().await;
    owner.handle_form_submit(fields("https://a.test")).await;

    let mut other = client(&base_url, "key-b", "y\n");
    other.startup().await;
    other.render_monitor(owner.state().monitors()[0].clone());

    let outcome = other.handle_delete(&MonitorId::from("1")).await;

    assert_eq!(outcome, DeleteOutcome::Failed);
    assert!(prompt_output(&other).ends_with("Error: Could not delete monitor.\n"));
    assert_eq!(other.view().list().cards().len(), 1);
}

#[tokio::test]
async fn declined_delete_keeps_server_state() {
    let (base_url, state) = spawn_stub().await;
    let mut c = client(&base_url, "key-a", "n\n");
    c.startup().await;
    c.handle_form_submit(fields("https://a.test")).await;

    let outcome = c.handle_delete(&MonitorId::from("1")).await;

    assert_eq!(outcome, DeleteOutcome::Declined);
    assert_eq!(state.monitors.lock().unwrap().len(), 1);
    assert_eq!(c.view().list().cards().len(), 1);
}

#[tokio::test]
async fn unreachable_api_degrades_list_to_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base_url = format!("http://{addr}");
    let err = http_api(&base_url).list(&UserKey::from("key-a")).await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));

    let mut c = client(&base_url, "key-a", "");
    c.startup().await;
    assert_eq!(c.view().list(), &ListView::Error(LOAD_ERROR_MESSAGE.to_owned()));
}

#[tokio::test]
async fn error_status_survives_truncated_body() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await.unwrap();
        // Promise more body than is sent, then hang up.
        socket
            .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 64\r\n\r\n{\"detail\":")
            .await
            .unwrap();
        let _ = socket.shutdown().await;
    });

    let err = http_api(&format!("http://{addr}")).list(&UserKey::from("key-a")).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 503, detail: None }), "{err:?}");
    assert_eq!(err.to_string(), "HTTP error! status: 503");
}
