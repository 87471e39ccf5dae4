// URL summarizer client
//
// Calls the hosted summary extractor (`POST {base}/url_content_summarizer`)
// and maps its reply onto the `UrlAnalysis` shape the dispatcher decodes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pipeline::types::ERROR_TONE;
use crate::pipeline::{ContentAnalyzer, UrlAnalysis};

const ENDPOINT: &str = "/url_content_summarizer";
const SOURCE_TONE: &str = "Informative";
const NO_SUMMARY: &str = "No summary provided.";
const UNKNOWN_API_ERROR: &str = "Unknown API error during URL summarization.";

pub struct UrlSummarizer {
    client: Client,
    base_url: String,
}

impl UrlSummarizer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn summarize(&self, url: &str) -> Result<SummaryResponse> {
        let endpoint = format!("{}{}", self.base_url, ENDPOINT);
        tracing::debug!("Requesting summary of {} from {}", url, endpoint);

        let response = self
            .client
            .post(&endpoint)
            .json(&SummaryRequest { url })
            .send()
            .await
            .context("Failed to reach URL summarizer")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("URL summarizer returned {}: {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse URL summarizer response")
    }
}

/// Map a summarizer reply onto the analysis shape.
///
/// Any status other than `success` is reported through an `"Error"` tone
/// rather than as a failed call.
fn to_analysis(response: SummaryResponse) -> UrlAnalysis {
    let analysis = response.analysis.unwrap_or_default();

    if response.status.as_deref() == Some("success") {
        UrlAnalysis {
            summary: analysis.summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
            main_points: analysis.key_points,
            tone_of_source: SOURCE_TONE.to_string(),
        }
    } else {
        let message = response
            .message
            .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
        UrlAnalysis {
            summary: analysis.summary.unwrap_or(message),
            main_points: analysis.key_points,
            tone_of_source: ERROR_TONE.to_string(),
        }
    }
}

#[async_trait]
impl ContentAnalyzer for UrlSummarizer {
    async fn analyze(&self, locator: &str) -> Result<String> {
        let analysis = to_analysis(self.summarize(locator).await?);
        serde_json::to_string(&analysis).context("Failed to encode URL analysis")
    }
}

#[derive(Debug, Serialize)]
struct SummaryRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    status: Option<String>,
    message: Option<String>,
    analysis: Option<SummaryBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryBody {
    summary: Option<String>,
    #[serde(default)]
    key_points: Vec<String>,
}
