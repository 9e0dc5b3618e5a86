use std::pin::Pin;
use std::sync::Arc;

use analyser_core::action::ActionMessage;
use analyser_core::job_events::unknown_action_message;
use analyser_core::progress::ErrorReply;
use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::ws::dispatch::{ActionContext, ActionDispatcher, Dispatch, Flow};
use crate::ws::emitter::ProgressEmitter;

/// Inbound half of a connection.
pub type BoxStream = Pin<Box<dyn Stream<Item = Result<Message, axum::Error>> + Send>>;

/// Next meaningful inbound frame.
#[derive(Debug)]
pub(crate) enum Inbound {
    Text(String),
    /// Close frame or end of stream.
    Closed,
    /// The transport failed while reading.
    Failed(axum::Error),
}

/// Read until a text frame, a close, or an error. Binary and ping/pong
/// frames are skipped.
pub(crate) async fn read_frame(stream: &mut BoxStream) -> Inbound {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Inbound::Text(text.as_str().to_owned()),
            Some(Ok(Message::Close(_))) | None => return Inbound::Closed,
            Some(Ok(Message::Binary(_))) => {
                tracing::debug!("Ignoring binary frame");
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => return Inbound::Failed(e),
        }
    }
}

/// Why the listener stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerExit {
    /// A handler asked to stop (e.g. `cancel`).
    ActionStop(String),
    /// The client went away; the job token has been tripped.
    Disconnected,
    /// The supervisor told the listener to stop.
    Stopped,
    /// An unexpected failure ended the loop.
    Failed(String),
}

/// Reads client control messages for one job and routes them through the
/// [`ActionDispatcher`].
pub struct MessageListener {
    stream: BoxStream,
    dispatcher: Arc<ActionDispatcher>,
    ctx: ActionContext,
    emitter: ProgressEmitter,
}

impl MessageListener {
    pub fn new(
        stream: BoxStream,
        dispatcher: Arc<ActionDispatcher>,
        ctx: ActionContext,
        emitter: ProgressEmitter,
    ) -> Self {
        Self {
            stream,
            dispatcher,
            ctx,
            emitter,
        }
    }

    /// Service inbound messages until a handler stops the loop, the client
    /// disconnects, or `stop` is triggered.
    pub async fn run(mut self, stop: CancellationToken) -> ListenerExit {
        let conn_id = self.ctx.conn_id.clone();

        loop {
            let frame = tokio::select! {
                biased;
                () = stop.cancelled() => return ListenerExit::Stopped,
                frame = read_frame(&mut self.stream) => frame,
            };

            let text = match frame {
                Inbound::Text(text) => text,
                Inbound::Closed => {
                    tracing::info!(conn_id = %conn_id, "Client disconnected, cancelling job");
                    self.ctx.cancel.cancel();
                    return ListenerExit::Disconnected;
                }
                Inbound::Failed(e) => {
                    tracing::info!(conn_id = %conn_id, error = %e, "Connection lost, cancelling job");
                    self.ctx.cancel.cancel();
                    return ListenerExit::Disconnected;
                }
            };

            let message = match ActionMessage::parse(&text) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id, error = %e, "Ignoring inbound message");
                    continue;
                }
            };

            match self.dispatcher.dispatch(&self.ctx, &message) {
                Dispatch::Handled(Flow::Continue) => {}
                Dispatch::Handled(Flow::Stop) => return ListenerExit::ActionStop(message.action),
                Dispatch::Unknown => {
                    tracing::warn!(conn_id = %conn_id, action = %message.action, "Unknown action");
                    let reply = ErrorReply::new(unknown_action_message(&message.action))
                        .with_available_actions(self.dispatcher.available_actions());
                    if let Err(e) = self.emitter.send(&reply).await {
                        tracing::error!(conn_id = %conn_id, error = %e, "Error in message listener");
                        return ListenerExit::Failed(e.to_string());
                    }
                }
            }
        }
    }
}
