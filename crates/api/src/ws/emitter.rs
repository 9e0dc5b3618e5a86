use std::pin::Pin;
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt};
use serde::Serialize;
use tokio::sync::Mutex;

/// Outbound half of a connection.
pub type BoxSink = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Connection closed: {0}")]
    Closed(axum::Error),
}

/// Serializes outbound messages onto a connection's sink.
///
/// Clones share the same sink behind a mutex, so a write from one component
/// is never interleaved with a write from another. Each `send` resolves once
/// the frame has been handed to the transport.
#[derive(Clone)]
pub struct ProgressEmitter {
    sink: Arc<Mutex<BoxSink>>,
}

impl ProgressEmitter {
    pub fn new(sink: BoxSink) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Serialize `message` as JSON and write it as a text frame.
    pub async fn send<T: Serialize>(&self, message: &T) -> Result<(), EmitError> {
        let text = serde_json::to_string(message)?;
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(EmitError::Closed)
    }

    /// Like [`send`](Self::send), but a failure is logged and dropped.
    ///
    /// Used for terminal notifications and error replies, where the peer
    /// may already be gone.
    pub async fn send_best_effort<T: Serialize>(&self, message: &T) {
        if let Err(e) = self.send(message).await {
            tracing::debug!(error = %e, "Could not send message (connection likely closed)");
        }
    }

    /// Flush and close the sink. Errors are ignored.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        if let Err(e) = sink.close().await {
            tracing::trace!(error = %e, "Sink already closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::channel::mpsc;
    use futures::StreamExt;
    use serde_json::json;

    use super::*;

    fn channel_emitter() -> (ProgressEmitter, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded();
        (ProgressEmitter::new(Box::pin(tx.sink_map_err(axum::Error::new))), rx)
    }

    fn text(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(t) => serde_json::from_str(t.as_str()).unwrap(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_json_text_frames_in_order() {
        let (emitter, mut rx) = channel_emitter();

        emitter.send(&json!({"n": 1})).await.unwrap();
        emitter.clone().send(&json!({"n": 2})).await.unwrap();

        assert_eq!(text(rx.next().await.unwrap())["n"], 1);
        assert_eq!(text(rx.next().await.unwrap())["n"], 2);
    }

    #[tokio::test]
    async fn send_to_closed_peer_is_an_error() {
        let (emitter, rx) = channel_emitter();
        drop(rx);

        let result = emitter.send(&json!({"n": 1})).await;
        assert!(matches!(result, Err(EmitError::Closed(_))));

        // Best-effort variant swallows the same failure.
        emitter.send_best_effort(&json!({"n": 2})).await;
    }

    #[tokio::test]
    async fn close_ends_the_stream() {
        let (emitter, mut rx) = channel_emitter();
        emitter.close().await;
        assert!(rx.next().await.is_none());
    }
}
