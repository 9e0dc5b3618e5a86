//! The initial message of an analysis connection.

use serde::Deserialize;

use crate::error::CoreError;
use crate::job_events::DEFAULT_PROVIDER;

/// Longest ticker accepted, exchange suffix included.
pub const MAX_TICKER_LEN: usize = 20;

/// Raw shape of the first inbound message.
///
/// Both fields are optional at the wire level so that a missing ticker can
/// be reported with the protocol's own error message instead of a serde one.
#[derive(Debug, Default, Deserialize)]
struct InitialMessage {
    stock_ticker: Option<String>,
    llm_choice: Option<String>,
}

/// A validated request for one analysis job.
///
/// Created once per connection from the first inbound message and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    ticker: String,
    provider: String,
}

impl AnalysisRequest {
    /// Build a request, trimming both fields.
    ///
    /// An empty ticker is rejected; an empty provider falls back to
    /// [`DEFAULT_PROVIDER`]. Both values end up in report file names, so
    /// anything that could act as a path component is refused.
    pub fn new(ticker: &str, provider: Option<&str>) -> Result<Self, CoreError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(CoreError::MissingTicker);
        }
        if !is_valid_ticker(ticker) {
            return Err(CoreError::InvalidTicker(ticker.to_string()));
        }

        let provider = provider
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PROVIDER);
        if !is_valid_provider(provider) {
            return Err(CoreError::InvalidProvider(provider.to_string()));
        }

        Ok(Self {
            ticker: ticker.to_string(),
            provider: provider.to_string(),
        })
    }

    /// Parse the first text frame of a connection.
    ///
    /// Non-JSON input and non-object JSON are [`CoreError::MalformedMessage`];
    /// a missing, null, or blank `stock_ticker` is [`CoreError::MissingTicker`].
    pub fn from_initial_message(text: &str) -> Result<Self, CoreError> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| CoreError::MalformedMessage(e.to_string()))?;
        if !value.is_object() {
            return Err(CoreError::MalformedMessage(
                "expected a JSON object".to_string(),
            ));
        }

        // Fields of the wrong type are treated as absent.
        let initial: InitialMessage = serde_json::from_value(value).unwrap_or_default();
        let ticker = initial.stock_ticker.ok_or(CoreError::MissingTicker)?;
        Self::new(&ticker, initial.llm_choice.as_deref())
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

/// Symbols like `AAPL`, `BRK.B`, `RDS-A`, `^GSPC` or `EURUSD=X`.
pub fn is_valid_ticker(ticker: &str) -> bool {
    ticker.len() <= MAX_TICKER_LEN
        && !ticker.contains("..")
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'))
}

fn is_valid_provider(provider: &str) -> bool {
    provider
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
