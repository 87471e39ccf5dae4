// Web-search-backed research
//
// Runs the request's topic through a Tavily-compatible search API
// (`POST {base}/search`) and hands the hits, plus today's date, to an LLM
// that condenses them into the `{"summary"}` research shape.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::llm::LlmCollaborator;
use super::prompts::{sourced_research_prompt, RESEARCH_SYSTEM};
use crate::pipeline::Researcher;

const ENDPOINT: &str = "/search";
const SEARCH_DEPTH: &str = "basic";

/// Search engines reject very long queries
const MAX_QUERY_CHARS: usize = 400;

/// One search result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
}

pub struct SearchClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_results: u32,
}

impl SearchClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        max_results: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_results,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let endpoint = format!("{}{}", self.base_url, ENDPOINT);
        tracing::debug!("Searching {} for: {}", endpoint, query);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&SearchRequest {
                query,
                search_depth: SEARCH_DEPTH,
                max_results: self.max_results,
            })
            .send()
            .await
            .context("Failed to reach search API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Search API returned {}: {}", status, body);
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("Failed to parse search API response")?;
        Ok(body.results)
    }
}

/// Researcher that grounds the model's summary in live search results.
///
/// A failed search degrades to a summary from the model's own knowledge.
pub struct WebResearcher {
    search: SearchClient,
    llm: LlmCollaborator,
}

impl WebResearcher {
    pub fn new(search: SearchClient, llm: LlmCollaborator) -> Self {
        Self { search, llm }
    }
}

#[async_trait]
impl Researcher for WebResearcher {
    async fn research(&self, query: &str) -> Result<String> {
        let terms = search_terms(query);
        let hits = match self.search.search(&terms).await {
            Ok(hits) => {
                tracing::info!("Web search returned {} results", hits.len());
                hits
            }
            Err(e) => {
                tracing::warn!("Web search failed, researching without sources: {:#}", e);
                Vec::new()
            }
        };

        let today = Local::now().format("%Y-%m-%d").to_string();
        self.llm
            .complete(RESEARCH_SYSTEM, sourced_research_prompt(query, &hits, &today))
            .await
    }
}

/// First non-empty line of the research query, capped in length
fn search_terms(query: &str) -> String {
    let line = query
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    line.chars().take(MAX_QUERY_CHARS).collect()
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}
