//! Drives one analysis job through its phases.
//!
//! Phase sequence and the progress emitted on entry:
//!
//! ```text
//! initializing        0   "Initializing stock analysis..."
//! researching        10   "Gathering data for <ticker>..."
//! analyzing          30   "Running technical analysis..."
//! analyzing          50   "Performing sentiment analysis..."
//!   -- engine call (blocking worker, not interruptible) --
//! generating_report  80   "Generating final report..."
//! completed         100   "Analysis complete!" + report + report_path
//! ```
//!
//! The cancellation token is checked at every phase boundary. While the
//! engine call is in flight it is not checked: the runner waits for the
//! worker to return and then, if cancellation was requested meanwhile,
//! reports `cancelled` and discards the result.

use std::sync::Arc;

use analyser_core::artifact::{ArtifactError, ArtifactStore};
use analyser_core::engine::{AnalysisEngine, EngineError, EngineInput, EngineOutput};
use analyser_core::job::JobState;
use analyser_core::job_events::{
    researching_message, MISSING_REPORT_PLACEHOLDER, MSG_GENERATING_REPORT, MSG_INITIALIZING,
    MSG_SENTIMENT_ANALYSIS, MSG_TECHNICAL_ANALYSIS, PROGRESS_GENERATING_REPORT,
    PROGRESS_INITIALIZING, PROGRESS_RESEARCHING, PROGRESS_SENTIMENT_ANALYSIS,
    PROGRESS_TECHNICAL_ANALYSIS,
};
use analyser_core::progress::ProgressEvent;
use analyser_core::request::AnalysisRequest;
use chrono::Datelike;
use tokio_util::sync::CancellationToken;

use crate::ws::emitter::ProgressEmitter;

/// Collaborators a job needs, shared by every connection.
#[derive(Clone)]
pub struct JobContext {
    pub engine: Arc<dyn AnalysisEngine>,
    pub artifacts: Arc<dyn ArtifactStore>,
}

/// Failures that end a job with an `error` event.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Analysis engine worker crashed: {0}")]
    EngineCrashed(String),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Owns the [`JobState`] of one connection's job.
pub struct JobRunner {
    ctx: JobContext,
    request: AnalysisRequest,
    emitter: ProgressEmitter,
    cancel: CancellationToken,
    state: JobState,
    progress: u8,
}

impl JobRunner {
    pub fn new(
        ctx: JobContext,
        request: AnalysisRequest,
        emitter: ProgressEmitter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            request,
            emitter,
            cancel,
            state: JobState::Initializing,
            progress: PROGRESS_INITIALIZING,
        }
    }

    /// Run the job to a terminal state. Exactly one terminal event is
    /// emitted; nothing escapes as an error.
    pub async fn run(mut self) -> JobState {
        tracing::info!(
            ticker = %self.request.ticker(),
            provider = %self.request.provider(),
            "Starting stock analysis",
        );

        match self.execute().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(
                    ticker = %self.request.ticker(),
                    error = %e,
                    "Error during stock analysis",
                );
                let event = ProgressEvent::failed(&self.request, self.progress, &e.to_string());
                self.finish(event).await
            }
        }
    }

    async fn execute(&mut self) -> Result<JobState, JobError> {
        let ticker = self.request.ticker().to_string();

        let phases = [
            (JobState::Initializing, MSG_INITIALIZING.to_string(), PROGRESS_INITIALIZING),
            (JobState::Researching, researching_message(&ticker), PROGRESS_RESEARCHING),
            (JobState::Analyzing, MSG_TECHNICAL_ANALYSIS.to_string(), PROGRESS_TECHNICAL_ANALYSIS),
            (JobState::Analyzing, MSG_SENTIMENT_ANALYSIS.to_string(), PROGRESS_SENTIMENT_ANALYSIS),
        ];
        for (state, message, progress) in phases {
            self.enter(state, message, progress).await;
            if self.cancel.is_cancelled() {
                return Ok(self.finish_cancelled().await);
            }
        }

        let output = self.run_engine().await?;
        if self.cancel.is_cancelled() {
            tracing::info!(
                ticker = %ticker,
                "Cancellation arrived while the engine was running, discarding result",
            );
            return Ok(self.finish_cancelled().await);
        }
        tracing::debug!(ticker = %ticker, summary = %output.summary, "Engine run finished");

        self.enter(
            JobState::GeneratingReport,
            MSG_GENERATING_REPORT.to_string(),
            PROGRESS_GENERATING_REPORT,
        )
        .await;
        if self.cancel.is_cancelled() {
            return Ok(self.finish_cancelled().await);
        }

        let key = self.ctx.artifacts.key(&ticker, self.request.provider());
        let report = match self.ctx.artifacts.read(&key).await {
            Ok(report) => report,
            Err(ArtifactError::NotFound(path)) => {
                tracing::warn!(ticker = %ticker, path = %path, "Engine finished without a report");
                MISSING_REPORT_PLACEHOLDER.to_string()
            }
            Err(e) => return Err(e.into()),
        };

        let state = self
            .finish(ProgressEvent::completed(&self.request, report, key.to_string()))
            .await;
        tracing::info!(ticker = %ticker, "Successfully completed analysis");
        Ok(state)
    }

    /// Enter a non-terminal phase and announce it.
    ///
    /// A failed write means the peer is gone, which counts as a disconnect:
    /// the token is tripped so the next checkpoint ends the job.
    async fn enter(&mut self, state: JobState, message: String, progress: u8) {
        self.state = state;
        self.progress = progress;
        let event = ProgressEvent::phase(&self.request, state, message, progress);
        if let Err(e) = self.emitter.send(&event).await {
            tracing::info!(
                ticker = %self.request.ticker(),
                error = %e,
                "Progress update failed, treating as disconnect",
            );
            self.cancel.cancel();
        }
        // Let the listener, which shares this task, see any pending action
        // before the caller checks the token.
        tokio::task::yield_now().await;
    }

    /// Run the engine on the blocking pool and wait for it to return.
    async fn run_engine(&self) -> Result<EngineOutput, JobError> {
        let engine = Arc::clone(&self.ctx.engine);
        let input = EngineInput {
            ticker: self.request.ticker().to_string(),
            provider: self.request.provider().to_string(),
            current_year: chrono::Utc::now().year(),
        };

        let output = tokio::task::spawn_blocking(move || engine.run(&input))
            .await
            .map_err(|e| JobError::EngineCrashed(e.to_string()))??;
        Ok(output)
    }

    async fn finish_cancelled(&mut self) -> JobState {
        tracing::info!(ticker = %self.request.ticker(), "Analysis cancelled");
        let event = ProgressEvent::cancelled(&self.request, self.progress);
        self.finish(event).await
    }

    /// Emit the terminal event. Send failures are swallowed.
    async fn finish(&mut self, event: ProgressEvent) -> JobState {
        self.state = event.status;
        self.emitter.send_best_effort(&event).await;
        self.state
    }
}
