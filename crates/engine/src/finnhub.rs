//! Ticker lookup through Finnhub's company profile endpoint.

use analyser_core::ticker::{CompanyProfile, TickerValidator, ValidationError};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Subset of `/stock/profile2` we care about. Unknown symbols come back as
/// an empty object.
#[derive(Debug, Deserialize)]
struct Profile {
    ticker: Option<String>,
    name: Option<String>,
    country: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "finnhubIndustry")]
    industry: Option<String>,
}

pub struct FinnhubValidator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FinnhubValidator {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TickerValidator for FinnhubValidator {
    async fn lookup(&self, symbol: &str) -> Result<Option<CompanyProfile>, ValidationError> {
        let url = format!("{}/stock/profile2", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol), ("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ValidationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValidationError::Status(status.as_u16()));
        }

        let profile: Profile = response
            .json()
            .await
            .map_err(|e| ValidationError::Request(e.to_string()))?;

        if profile.ticker.as_deref().is_none_or(str::is_empty) {
            return Ok(None);
        }

        Ok(Some(CompanyProfile {
            name: profile.name,
            country: profile.country,
            exchange: profile.exchange,
            industry: profile.industry,
        }))
    }
}
