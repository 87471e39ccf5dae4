// OpenAI-compatible chat completions provider
//
// OpenAI, Mistral, Groq and Gemini (via its OpenAI compatibility endpoint)
// all accept the same request format, so one client covers all of them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::retry::{with_retry, RetryPolicy};
use super::types::{ChatMessage, ProviderRequest, ProviderResponse};
use super::LlmProvider;
use crate::config::constants::DEFAULT_CALL_TIMEOUT_SECS;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// OpenAI-compatible API provider
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    provider_name: String,
    retry: RetryPolicy,
}

impl OpenAIProvider {
    pub fn new_openai(api_key: String) -> Result<Self> {
        Self::new(api_key, OPENAI_BASE_URL, "gpt-4o-mini", "openai")
    }

    pub fn new_mistral(api_key: String) -> Result<Self> {
        Self::new(api_key, MISTRAL_BASE_URL, "devstral-small-2505", "mistral")
    }

    /// Groq (by Groq Inc), not Grok (by X.AI)
    pub fn new_groq(api_key: String) -> Result<Self> {
        Self::new(api_key, GROQ_BASE_URL, "llama-3.1-8b-instant", "groq")
    }

    pub fn new_gemini(api_key: String) -> Result<Self> {
        Self::new(api_key, GEMINI_BASE_URL, "gemini-2.0-flash", "gemini")
    }

    /// Set custom model for this provider
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point at a different endpoint (proxies, self-hosted gateways, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn new(api_key: String, base_url: &str, default_model: &str, provider_name: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
            provider_name: provider_name.to_string(),
            retry: RetryPolicy::once(),
        })
    }

    /// Convert ProviderRequest to OpenAI API format
    fn to_openai_request<'a>(&'a self, request: &'a ProviderRequest) -> OpenAIRequest<'a> {
        let model = if request.model.is_empty() {
            self.default_model.as_str()
        } else {
            request.model.as_str()
        };

        OpenAIRequest {
            model,
            messages: &request.messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    /// Convert OpenAI response to ProviderResponse
    fn from_openai_response(&self, response: OpenAIResponse) -> Result<ProviderResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .with_context(|| format!("{} returned no choices in response", self.provider_name))?;

        Ok(ProviderResponse {
            id: response.id.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| self.default_model.clone()),
            text: choice.message.content.unwrap_or_default(),
            stop_reason: choice.finish_reason,
            provider: self.provider_name.clone(),
        })
    }

    /// Send a single message request (no retry)
    async fn send_message_once(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let openai_request = self.to_openai_request(request);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!("Sending request to {} API: {:?}", self.provider_name, openai_request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.provider_name))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "{} API request failed\n\nStatus: {}\nBody: {}",
                self.provider_name,
                status,
                error_body
            );
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} API response", self.provider_name))?;

        tracing::debug!("Received response: {:?}", openai_response);

        self.from_openai_response(openai_response)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        with_retry(&self.retry, || self.send_message_once(request)).await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
