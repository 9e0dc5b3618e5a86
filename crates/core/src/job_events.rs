//! Wire-level constants for the analysis WebSocket protocol.
//!
//! Used by the job runner when emitting progress and by the connection
//! supervisor and listener for their error replies.

/// Provider used when the initial request omits `llm_choice`.
pub const DEFAULT_PROVIDER: &str = "openai";

/// LLM providers the engines know how to drive.
pub const SUPPORTED_PROVIDERS: [&str; 3] = ["openai", "anthropic", "gemini"];

/// Action name that requests cancellation of the running job.
pub const ACTION_CANCEL: &str = "cancel";

/// Progress percentages emitted on entry to each phase.
pub const PROGRESS_INITIALIZING: u8 = 0;
pub const PROGRESS_RESEARCHING: u8 = 10;
pub const PROGRESS_TECHNICAL_ANALYSIS: u8 = 30;
pub const PROGRESS_SENTIMENT_ANALYSIS: u8 = 50;
pub const PROGRESS_GENERATING_REPORT: u8 = 80;
pub const PROGRESS_COMPLETED: u8 = 100;

pub const MSG_INITIALIZING: &str = "Initializing stock analysis...";
pub const MSG_TECHNICAL_ANALYSIS: &str = "Running technical analysis...";
pub const MSG_SENTIMENT_ANALYSIS: &str = "Performing sentiment analysis...";
pub const MSG_GENERATING_REPORT: &str = "Generating final report...";
pub const MSG_COMPLETED: &str = "Analysis complete!";
pub const MSG_CANCELLED: &str = "Analysis was cancelled";

/// Report body sent when the engine finished but no artifact was found.
pub const MISSING_REPORT_PLACEHOLDER: &str =
    "Report file not found. Analysis may have encountered an issue.";

/// Message for the researching phase, which names the ticker.
pub fn researching_message(ticker: &str) -> String {
    format!("Gathering data for {ticker}...")
}

/// Message for a failed job.
pub fn failure_message(description: &str) -> String {
    format!("An error occurred: {description}")
}

/// Error text for an action name with no registered handler.
pub fn unknown_action_message(action: &str) -> String {
    format!("Unknown action: {action}")
}
