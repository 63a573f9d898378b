//! Finnhub security-type lookup.
//!
//! Uses the /search endpoint and keeps the result whose symbol matches the
//! request exactly. Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::provider::{RateLimit, RequestPacer, SecurityTypeLookup};

pub const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";
const FREE_TIER_REQUESTS_PER_MINUTE: u32 = 60;

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Search results
    #[serde(default)]
    result: Vec<SearchItem>,
}

/// Individual search result item
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    /// Full description/name
    #[serde(default)]
    description: String,
    /// Display symbol
    #[serde(default)]
    display_symbol: String,
    /// Symbol for API calls
    symbol: String,
    /// Security type (e.g., "Common Stock", "ETP")
    #[serde(rename = "type", default)]
    security_type: String,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub market data provider.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limit: RateLimit,
    pacer: RequestPacer,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider paced for the free tier.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        let rate_limit = RateLimit::per_minute(FREE_TIER_REQUESTS_PER_MINUTE);

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            pacer: RequestPacer::new(rate_limit.min_delay),
            rate_limit,
        }
    }

    /// Point the provider at another host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.pacer = RequestPacer::new(rate_limit.min_delay);
        self.rate_limit = rate_limit;
        self
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        self.pacer.wait().await;

        // Add API key as header (more secure than query param)
        let request = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        // 403 means the key's quota is exhausted
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if let Ok(ErrorResponse {
                error: Some(message),
            }) = serde_json::from_str::<ErrorResponse>(&body)
            {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message,
                });
            }

            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, MarketDataError> {
        let text = self.fetch("/search", &[("q", query)]).await?;

        let response: SearchResponse =
            serde_json::from_str(&text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse search response: {}", e),
            })?;

        debug!(
            "Finnhub: found {} search results for '{}'",
            response.result.len(),
            query
        );
        Ok(response.result)
    }
}

#[async_trait]
impl SecurityTypeLookup for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn lookup_security_type(&self, symbol: &str) -> Result<String, MarketDataError> {
        let wanted = symbol.trim().to_uppercase();
        let results = self.search(&wanted).await?;

        let item = results
            .iter()
            .find(|item| item.symbol.eq_ignore_ascii_case(&wanted))
            .or_else(|| {
                results
                    .iter()
                    .find(|item| item.display_symbol.eq_ignore_ascii_case(&wanted))
            })
            .filter(|item| !item.security_type.is_empty())
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        debug!(
            "Finnhub: {} ({}) is {}",
            item.symbol, item.description, item.security_type
        );
        Ok(map_security_type(&item.security_type))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Map Finnhub security type to our security type.
pub fn map_security_type(finnhub_type: &str) -> String {
    match finnhub_type.to_lowercase().as_str() {
        "common stock" | "stock" => "Stock".to_string(),
        "etf" | "etp" => "ETF".to_string(),
        "mutual fund" | "fund" => "Mutual Fund".to_string(),
        "adr" | "american depositary receipt" => "ADR".to_string(),
        "reit" => "REIT".to_string(),
        "warrant" => "Warrant".to_string(),
        "preferred stock" | "preferred" => "Preferred Stock".to_string(),
        "unit" => "Unit".to_string(),
        "closed-end fund" => "Closed-End Fund".to_string(),
        _ => finnhub_type.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
