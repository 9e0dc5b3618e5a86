//! End-to-end WebSocket protocol tests against a bound server.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use analyser_api::state::AppState;
use common::{job_context, GatedEngine, MemoryStore};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Serve `state` on an ephemeral port.
async fn spawn_server(state: AppState) -> SocketAddr {
    let app = common::build_test_app(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{addr}/ws/report")).await.unwrap();
    ws
}

async fn send(ws: &mut Client, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

/// Read JSON frames until the server closes the connection.
async fn read_until_close(ws: &mut Client) -> Vec<Value> {
    let mut frames = Vec::new();
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for the server");
        match next {
            Some(Ok(Message::Text(text))) => frames.push(serde_json::from_str(&text).unwrap()),
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
            Some(Ok(_)) => {}
        }
    }
    frames
}

// ---------------------------------------------------------------------------
// Test: a full session streams progress and closes after the report
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_session_streams_progress_then_closes() {
    let state = common::test_state(None);
    let addr = spawn_server(state).await;
    let mut ws = connect(addr).await;

    send(&mut ws, json!({"stock_ticker": "TSLA", "llm_choice": "anthropic"})).await;
    let frames = read_until_close(&mut ws).await;

    assert_eq!(common::progress_values(&frames), vec![0, 10, 30, 50, 80, 100]);
    let last = frames.last().unwrap();
    assert_eq!(last["status"], "completed");
    assert_eq!(last["llm_choice"], "anthropic");
    assert_eq!(last["report_path"], "output/TSLA_anthropic_report.md");
}

// ---------------------------------------------------------------------------
// Test: a request without a ticker gets one error and the socket closes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_ticker_gets_error_and_close() {
    let addr = spawn_server(common::test_state(None)).await;
    let mut ws = connect(addr).await;

    send(&mut ws, json!({"llm_choice": "openai"})).await;
    let frames = read_until_close(&mut ws).await;

    assert_eq!(frames, vec![json!({"error": "No stock ticker provided"})]);
}

// ---------------------------------------------------------------------------
// Test: cancel over the wire while the engine runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_over_the_wire_ends_with_cancelled() {
    let (engine, release) = GatedEngine::new();
    let state = AppState::new(
        common::test_config(),
        job_context(engine.clone(), Arc::new(MemoryStore::default())),
        None,
    );
    let registry = state.registry.clone();
    let addr = spawn_server(state).await;
    let mut ws = connect(addr).await;

    send(&mut ws, json!({"stock_ticker": "AAPL"})).await;
    engine.started.notified().await;
    assert_eq!(registry.session_count().await, 1);

    send(&mut ws, json!({"action": "cancel"})).await;
    // Give the listener time to trip the token before the engine returns.
    tokio::time::sleep(Duration::from_millis(100)).await;
    release.send(()).unwrap();

    let frames = read_until_close(&mut ws).await;
    let last = frames.last().unwrap();
    assert_eq!(last["status"], "cancelled");
    assert_eq!(last["progress"], 50);
    assert!(last.get("report").is_none());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(registry.session_count().await, 0);
}
