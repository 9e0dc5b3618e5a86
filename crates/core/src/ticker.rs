//! Ticker symbol lookup, used by the REST validation endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::request::is_valid_ticker;

/// Company details returned by a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Lookup request failed: {0}")]
    Request(String),

    #[error("Lookup returned HTTP {0}")]
    Status(u16),
}

/// Market lookup for ticker symbols.
#[async_trait]
pub trait TickerValidator: Send + Sync {
    /// `Ok(None)` means the provider answered but knows no such symbol.
    async fn lookup(&self, symbol: &str) -> Result<Option<CompanyProfile>, ValidationError>;
}

/// Trim and uppercase a user-supplied symbol.
pub fn normalize_symbol(raw: &str) -> Result<String, CoreError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(CoreError::Validation("Ticker symbol is required".to_string()));
    }
    if !is_valid_ticker(&symbol) {
        return Err(CoreError::Validation(format!("Invalid ticker symbol: {symbol}")));
    }
    Ok(symbol)
}
