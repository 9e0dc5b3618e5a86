//! Outbound messages: progress events and error-only replies.

use serde::{Deserialize, Serialize};

use crate::job::JobState;
use crate::job_events::{failure_message, MSG_CANCELLED, MSG_COMPLETED, PROGRESS_COMPLETED};
use crate::request::AnalysisRequest;

/// One status update for a running job.
///
/// `report` is only set on `completed`, `error` only on `error`; `cancelled`
/// carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    #[serde(rename = "stock_ticker")]
    pub ticker: String,
    #[serde(rename = "llm_choice")]
    pub provider: String,
    pub status: JobState,
    pub message: String,
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressEvent {
    /// A non-terminal phase update.
    pub fn phase(
        request: &AnalysisRequest,
        status: JobState,
        message: impl Into<String>,
        progress: u8,
    ) -> Self {
        Self {
            ticker: request.ticker().to_string(),
            provider: request.provider().to_string(),
            status,
            message: message.into(),
            progress,
            report: None,
            report_path: None,
            error: None,
        }
    }

    pub fn completed(
        request: &AnalysisRequest,
        report: String,
        report_path: impl Into<String>,
    ) -> Self {
        Self {
            report: Some(report),
            report_path: Some(report_path.into()),
            ..Self::phase(request, JobState::Completed, MSG_COMPLETED, PROGRESS_COMPLETED)
        }
    }

    /// Cancellation keeps the last emitted progress so the sequence never
    /// goes backwards.
    pub fn cancelled(request: &AnalysisRequest, progress: u8) -> Self {
        Self::phase(request, JobState::Cancelled, MSG_CANCELLED, progress)
    }

    pub fn failed(request: &AnalysisRequest, progress: u8, description: &str) -> Self {
        Self {
            error: Some(description.to_string()),
            ..Self::phase(
                request,
                JobState::Failed,
                failure_message(description),
                progress,
            )
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Error-only reply with no job context.
///
/// Sent for a malformed initial message and for unknown actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_actions: Option<Vec<String>>,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            available_actions: None,
        }
    }

    pub fn with_available_actions(mut self, actions: Vec<String>) -> Self {
        self.available_actions = Some(actions);
        self
    }
}
