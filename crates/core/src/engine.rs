//! Interface to the external analysis engine.
//!
//! The engine is a single synchronous call that may run for minutes and
//! exposes no checkpoints. Callers must run it off the async executor
//! (`tokio::task::spawn_blocking`) and cannot interrupt it once started.

use crate::job_events::SUPPORTED_PROVIDERS;

/// Arguments for one engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInput {
    pub ticker: String,
    pub provider: String,
    /// Calendar year the analysis is written for.
    pub current_year: i32,
}

/// Opaque result of a successful run. The report itself is read back from
/// the artifact store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub summary: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    #[error("Engine exited with code {exit_code}: {stderr}")]
    ExecutionFailed { exit_code: i32, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

/// Blocking analysis pipeline.
pub trait AnalysisEngine: Send + Sync {
    /// Run the full analysis for `input`, writing the report artifact as a
    /// side effect.
    fn run(&self, input: &EngineInput) -> Result<EngineOutput, EngineError>;
}

/// Reject providers no engine can drive.
pub fn check_provider(provider: &str) -> Result<(), EngineError> {
    if SUPPORTED_PROVIDERS.contains(&provider) {
        Ok(())
    } else {
        Err(EngineError::UnsupportedProvider(provider.to_string()))
    }
}
