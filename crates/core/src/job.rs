//! Job lifecycle states.

use serde::{Deserialize, Serialize};

/// Phase of an analysis job.
///
/// Serialized as the `status` field of progress events. `Failed` goes over
/// the wire as `"error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Initializing,
    Researching,
    Analyzing,
    GeneratingReport,
    Completed,
    Cancelled,
    #[serde(rename = "error")]
    Failed,
}

impl JobState {
    /// Wire name of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Researching => "researching",
            Self::Analyzing => "analyzing",
            Self::GeneratingReport => "generating_report",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "error",
        }
    }

    /// Whether this state ends the job.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
