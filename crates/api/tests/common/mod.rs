#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::time::Duration;

use analyser_api::config::{EngineConfig, LogFormat, ServerConfig};
use analyser_api::job::JobContext;
use analyser_api::router::build_app_router;
use analyser_api::state::AppState;
use analyser_api::ws::{BoxSink, BoxStream};
use analyser_core::artifact::{ArtifactError, ArtifactKey, ArtifactStore};
use analyser_core::engine::{AnalysisEngine, EngineError, EngineInput, EngineOutput};
use analyser_core::ticker::{CompanyProfile, TickerValidator, ValidationError};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Request, Response};
use axum::Router;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

pub const TEST_OUTPUT_DIR: &str = "output";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:3000` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        output_dir: PathBuf::from(TEST_OUTPUT_DIR),
        engine: EngineConfig::Simulated {
            delay: Duration::ZERO,
        },
        finnhub: None,
        log_format: LogFormat::Pretty,
    }
}

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// Returns immediately and counts its calls.
#[derive(Default)]
pub struct InstantEngine {
    pub calls: AtomicUsize,
}

impl AnalysisEngine for InstantEngine {
    fn run(&self, input: &EngineInput) -> Result<EngineOutput, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EngineOutput {
            summary: format!("analysed {}", input.ticker),
        })
    }
}

/// Always fails with the given description.
pub struct FailingEngine(pub String);

impl AnalysisEngine for FailingEngine {
    fn run(&self, _input: &EngineInput) -> Result<EngineOutput, EngineError> {
        Err(EngineError::Failed(self.0.clone()))
    }
}

/// Blocks inside `run` until the test releases it.
pub struct GatedEngine {
    pub started: Arc<Notify>,
    pub returned: Arc<AtomicBool>,
    release: Mutex<std_mpsc::Receiver<()>>,
}

impl GatedEngine {
    /// The engine plus the sender that lets `run` return.
    pub fn new() -> (Arc<Self>, std_mpsc::Sender<()>) {
        let (tx, rx) = std_mpsc::channel();
        let engine = Arc::new(Self {
            started: Arc::new(Notify::new()),
            returned: Arc::new(AtomicBool::new(false)),
            release: Mutex::new(rx),
        });
        (engine, tx)
    }
}

impl AnalysisEngine for GatedEngine {
    fn run(&self, _input: &EngineInput) -> Result<EngineOutput, EngineError> {
        self.started.notify_one();
        // A dropped sender releases the gate as well.
        let _ = self.release.lock().unwrap().recv();
        self.returned.store(true, Ordering::SeqCst);
        Ok(EngineOutput::default())
    }
}

/// Reports held in memory, keyed by their rendered path.
#[derive(Default)]
pub struct MemoryStore {
    reports: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_report(ticker: &str, provider: &str, content: &str) -> Self {
        let store = Self::default();
        let key = store.key(ticker, provider);
        store
            .reports
            .lock()
            .unwrap()
            .insert(key.to_string(), content.to_string());
        store
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    fn key(&self, ticker: &str, provider: &str) -> ArtifactKey {
        ArtifactKey::new(Path::new(TEST_OUTPUT_DIR), ticker, provider)
    }

    async fn read(&self, key: &ArtifactKey) -> Result<String, ArtifactError> {
        self.reports
            .lock()
            .unwrap()
            .get(&key.to_string())
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(key.to_string()))
    }
}

/// Answers lookups from a fixed table; `fail` makes every lookup error.
#[derive(Default)]
pub struct StubValidator {
    pub profiles: HashMap<String, CompanyProfile>,
    pub fail: bool,
}

#[async_trait]
impl TickerValidator for StubValidator {
    async fn lookup(&self, symbol: &str) -> Result<Option<CompanyProfile>, ValidationError> {
        if self.fail {
            return Err(ValidationError::Status(503));
        }
        Ok(self.profiles.get(symbol).cloned())
    }
}

pub fn job_context(
    engine: Arc<dyn AnalysisEngine>,
    artifacts: Arc<dyn ArtifactStore>,
) -> JobContext {
    JobContext { engine, artifacts }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub fn test_state(validator: Option<Arc<dyn TickerValidator>>) -> AppState {
    let jobs = job_context(
        Arc::new(InstantEngine::default()),
        Arc::new(MemoryStore::default()),
    );
    AppState::new(test_config(), jobs, validator)
}

/// Build the full application router with all middleware layers.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// In-memory connections
// ---------------------------------------------------------------------------

/// Client end of an in-memory connection.
pub struct TestClient {
    inbound: Option<mpsc::UnboundedSender<Result<Message, axum::Error>>>,
    outbound: mpsc::UnboundedReceiver<Message>,
}

impl TestClient {
    pub fn send_text(&self, text: &str) {
        self.inbound
            .as_ref()
            .expect("client already disconnected")
            .unbounded_send(Ok(Message::Text(text.into())))
            .unwrap();
    }

    pub fn send_json(&self, value: serde_json::Value) {
        self.send_text(&value.to_string());
    }

    /// End the inbound stream, as a dropped socket would.
    pub fn disconnect(&mut self) {
        self.inbound.take();
    }

    /// Stop reading server frames; later writes to this connection fail.
    pub fn stop_reading(&mut self) {
        self.outbound.close();
    }

    /// Next server frame as JSON, or `None` once the server closed the sink.
    pub async fn recv(&mut self) -> Option<serde_json::Value> {
        let frame = tokio::time::timeout(Duration::from_secs(5), self.outbound.next())
            .await
            .expect("timed out waiting for a server frame")?;
        match frame {
            Message::Text(text) => Some(serde_json::from_str(text.as_str()).unwrap()),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    /// Every remaining server frame until the server closes the sink.
    pub async fn recv_all(&mut self) -> Vec<serde_json::Value> {
        let mut frames = Vec::new();
        while let Some(frame) = self.recv().await {
            frames.push(frame);
        }
        frames
    }
}

/// A connected pair: the client end and the server's socket halves.
pub fn connection() -> (TestClient, BoxSink, BoxStream) {
    let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();
    let (out_tx, out_rx) = mpsc::unbounded::<Message>();

    let client = TestClient {
        inbound: Some(in_tx),
        outbound: out_rx,
    };
    let sink: BoxSink = Box::pin(out_tx.sink_map_err(axum::Error::new));
    let stream: BoxStream = Box::pin(in_rx);
    (client, sink, stream)
}

/// Progress values of the job events among `frames` (error replies skipped).
pub fn progress_values(frames: &[serde_json::Value]) -> Vec<u64> {
    frames
        .iter()
        .filter_map(|f| f.get("progress").and_then(|p| p.as_u64()))
        .collect()
}

/// Statuses of the job events among `frames`.
pub fn statuses(frames: &[serde_json::Value]) -> Vec<String> {
    frames
        .iter()
        .filter_map(|f| f.get("status").and_then(|s| s.as_str()).map(str::to_string))
        .collect()
}
