//! Per-connection job supervision.
//!
//! One connection carries one job. The supervisor reads the initial request,
//! then drives the [`JobRunner`] and a [`MessageListener`] concurrently on
//! its own task. When either finishes, the other is told to stop and
//! awaited, so nothing started for the connection outlives
//! [`ConnectionSupervisor::supervise`]. The only other thread involved is
//! the blocking engine worker, which the runner always awaits. The job and
//! the listener share only the job's cancellation token.

use std::sync::Arc;

use analyser_core::error::CoreError;
use analyser_core::job::JobState;
use analyser_core::progress::ErrorReply;
use analyser_core::request::AnalysisRequest;
use analyser_core::types::ConnId;
use tokio_util::sync::CancellationToken;

use crate::job::{JobContext, JobRunner};
use crate::ws::dispatch::{ActionContext, ActionDispatcher};
use crate::ws::emitter::{BoxSink, ProgressEmitter};
use crate::ws::listener::{read_frame, BoxStream, Inbound, ListenerExit, MessageListener};
use crate::ws::registry::SessionRegistry;

/// Failures before a job could be started.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Request(#[from] CoreError),

    #[error("Connection error: {0}")]
    Transport(#[from] axum::Error),
}

/// How a supervised connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The client left before sending a request.
    Abandoned,
    /// The initial message was rejected; no job was started.
    Rejected(String),
    /// A job ran. Both tasks have finished.
    Finished { job: JobState, listener: ListenerExit },
}

/// Supervises analysis connections. One instance is shared by all of them.
pub struct ConnectionSupervisor {
    jobs: JobContext,
    dispatcher: Arc<ActionDispatcher>,
    registry: Arc<SessionRegistry>,
}

impl ConnectionSupervisor {
    pub fn new(
        jobs: JobContext,
        dispatcher: Arc<ActionDispatcher>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            jobs,
            dispatcher,
            registry,
        }
    }

    /// Handle one connection from the first message to the end of its job.
    pub async fn supervise(
        &self,
        conn_id: ConnId,
        sink: BoxSink,
        mut stream: BoxStream,
    ) -> SessionOutcome {
        let emitter = ProgressEmitter::new(sink);

        let request = match read_request(&mut stream).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::info!(conn_id = %conn_id, "Client disconnected before sending a request");
                return SessionOutcome::Abandoned;
            }
            Err(e) => {
                let reason = e.to_string();
                match &e {
                    ConnectionError::Request(_) => {
                        tracing::warn!(
                            conn_id = %conn_id,
                            error = %reason,
                            "Rejected analysis request",
                        );
                    }
                    ConnectionError::Transport(_) => {
                        tracing::error!(conn_id = %conn_id, error = %reason, "WebSocket error");
                    }
                }
                emitter.send_best_effort(&ErrorReply::new(reason.clone())).await;
                emitter.close().await;
                return SessionOutcome::Rejected(reason);
            }
        };

        let (job, listener) = self.run_job(&conn_id, request, &emitter, stream).await;
        emitter.close().await;

        SessionOutcome::Finished { job, listener }
    }

    /// Run the job and the listener side by side until one finishes, then
    /// stop and await the other.
    async fn run_job(
        &self,
        conn_id: &ConnId,
        request: AnalysisRequest,
        emitter: &ProgressEmitter,
        stream: BoxStream,
    ) -> (JobState, ListenerExit) {
        let cancel = CancellationToken::new();
        let stop_listening = CancellationToken::new();

        let overlapping = self
            .registry
            .sessions_for(request.ticker(), request.provider())
            .await;
        if !overlapping.is_empty() {
            tracing::warn!(
                conn_id = %conn_id,
                ticker = %request.ticker(),
                provider = %request.provider(),
                others = overlapping.len(),
                "Another session is analysing the same ticker and provider; reports may overwrite each other",
            );
        }
        self.registry
            .add(conn_id.clone(), &request, cancel.clone())
            .await;

        let listener = MessageListener::new(
            stream,
            Arc::clone(&self.dispatcher),
            ActionContext {
                conn_id: conn_id.clone(),
                request: request.clone(),
                cancel: cancel.clone(),
            },
            emitter.clone(),
        );
        let listening = listener.run(stop_listening.clone());
        let runner = JobRunner::new(self.jobs.clone(), request, emitter.clone(), cancel.clone());
        let running = runner.run();
        tokio::pin!(listening);
        tokio::pin!(running);

        // Both run on this task. The listener is polled first on every wake,
        // so an action already received is handled before the job reaches
        // its next checkpoint.
        let (job, listener) = tokio::select! {
            biased;
            exit = &mut listening => {
                cancel.cancel();
                (running.await, exit)
            }
            state = &mut running => {
                stop_listening.cancel();
                (state, listening.await)
            }
        };

        self.registry.remove(conn_id).await;

        tracing::info!(conn_id = %conn_id, job = %job, listener = ?listener, "Session finished");
        (job, listener)
    }
}

/// Read the first text frame and turn it into a request.
///
/// `Ok(None)` means the connection closed first.
async fn read_request(
    stream: &mut BoxStream,
) -> Result<Option<AnalysisRequest>, ConnectionError> {
    match read_frame(stream).await {
        Inbound::Text(text) => Ok(Some(AnalysisRequest::from_initial_message(&text)?)),
        Inbound::Closed => Ok(None),
        Inbound::Failed(e) => Err(e.into()),
    }
}
