//! Linkup web-search client
//!
//! Used by the portfolio, market-research, and tax agents to pull current
//! strategy and market snippets into their prompts. Search is best-effort:
//! callers treat any failure as an empty result set.

use crate::error::AdvisoryError;
use crate::models::{format_usd, Portfolio, Profile, SearchSnippet, TaxInfo};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_MAX_RESULTS: usize = 10;

/// Seam for the web-search service.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> crate::Result<Vec<SearchSnippet>>;
}

pub struct LinkupClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LinkupClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WebSearch for LinkupClient {
    async fn search(&self, query: &str, max_results: usize) -> crate::Result<Vec<SearchSnippet>> {
        let url = format!("{}/search", self.base_url);

        let request = SearchRequest {
            query: query.to_string(),
            max_results,
        };

        info!(query = %query, "Calling Linkup search API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AdvisoryError::SearchError(format!("Linkup request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::SearchError(format!(
                "Linkup returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| AdvisoryError::SearchError(format!("Invalid Linkup response: {}", e)))?;

        Ok(parsed.results)
    }
}

/// Run a search, mapping failure to an empty result set with a warning.
/// `search` may be `None` when no API key is configured.
pub async fn search_or_empty(
    search: Option<&dyn WebSearch>,
    query: &str,
) -> Vec<SearchSnippet> {
    let Some(search) = search else {
        return Vec::new();
    };

    match search.search(query, DEFAULT_MAX_RESULTS).await {
        Ok(snippets) => snippets,
        Err(e) => {
            warn!("Web search failed, continuing without results: {}", e);
            Vec::new()
        }
    }
}

//
// ================= Query builders =================
//

pub fn investment_strategy_query(profile: &Profile, portfolio: &Portfolio) -> String {
    format!(
        "investment strategies for {} risk tolerance {} timeline portfolio value {}",
        profile.risk_tolerance,
        profile.investment_timeline,
        format_usd(portfolio.total_value)
    )
}

pub fn market_trends_query() -> String {
    "current market trends investment analysis".to_string()
}

pub fn tax_strategy_query(tax_info: &TaxInfo) -> String {
    let bracket = tax_info.tax_bracket.as_deref().unwrap_or("unknown");
    let mut query = format!("tax optimization strategies {} tax bracket", bracket);
    if let Some(state) = &tax_info.state {
        query.push(' ');
        query.push_str(state);
    }
    query
}

/// Format snippets for interpolation into an agent prompt.
pub fn format_snippets(snippets: &[SearchSnippet]) -> String {
    if snippets.is_empty() {
        return "No web search results available.".to_string();
    }

    snippets
        .iter()
        .map(|s| format!("- {}: {} ({})", s.title, s.content, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    query: String,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchSnippet>,
}
