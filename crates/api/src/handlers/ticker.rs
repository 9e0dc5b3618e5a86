//! Handler for ticker symbol validation.
//!
//! The lookup is advisory: a failing or missing validator never turns into
//! an HTTP error, only into `valid: false` (or format-only acceptance).

use analyser_core::ticker::normalize_symbol;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Deserialize)]
pub struct ValidateTickerRequest {
    #[serde(default)]
    pub ticker: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateTickerResponse {
    pub valid: bool,
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl ValidateTickerResponse {
    fn rejected(ticker: String, message: &str) -> Self {
        Self {
            valid: false,
            ticker,
            message: Some(message.to_string()),
            company_name: None,
            country: None,
            exchange: None,
            industry: None,
        }
    }
}

/// POST /api/validate-ticker
///
/// Normalise the symbol and look it up with the configured validator.
pub async fn validate_ticker(
    State(state): State<AppState>,
    Json(input): Json<ValidateTickerRequest>,
) -> AppResult<Json<ValidateTickerResponse>> {
    let ticker = normalize_symbol(&input.ticker)?;

    let Some(validator) = state.validator.as_ref() else {
        return Ok(Json(ValidateTickerResponse {
            valid: true,
            ticker,
            message: Some("Format validation only (API not available)".to_string()),
            company_name: None,
            country: None,
            exchange: None,
            industry: None,
        }));
    };

    let response = match validator.lookup(&ticker).await {
        Ok(Some(profile)) => {
            let or_unknown = |v: Option<String>| Some(v.unwrap_or_else(|| UNKNOWN.to_string()));
            ValidateTickerResponse {
                valid: true,
                ticker,
                message: None,
                company_name: or_unknown(profile.name),
                country: or_unknown(profile.country),
                exchange: or_unknown(profile.exchange),
                industry: or_unknown(profile.industry),
            }
        }
        Ok(None) => ValidateTickerResponse::rejected(ticker, "Ticker symbol not found"),
        Err(e) => {
            tracing::warn!(ticker = %ticker, error = %e, "Ticker lookup failed");
            ValidateTickerResponse::rejected(ticker, "Ticker symbol not found or API error")
        }
    };

    Ok(Json(response))
}
