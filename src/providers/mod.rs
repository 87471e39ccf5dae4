// LLM provider support
//
// An abstraction over OpenAI-compatible chat APIs plus the adapters that turn
// providers, web search and the URL summarizer into pipeline collaborators.

use anyhow::Result;
use async_trait::async_trait;

pub mod factory;
pub mod llm;
pub mod openai;
pub mod prompts;
pub mod retry;
pub mod types;
pub mod url_summarizer;
pub mod web_search;

pub use factory::{build_collaborators, create_provider_from_entry};
pub use llm::{LlmAnalyzer, LlmCollaborator};
pub use openai::OpenAIProvider;
pub use retry::{with_retry, RetryPolicy};
pub use types::{ChatMessage, ProviderRequest, ProviderResponse};
pub use url_summarizer::UrlSummarizer;
pub use web_search::{SearchClient, WebResearcher};

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a message and get a complete response
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Get the provider name (e.g., "openai", "groq")
    fn name(&self) -> &str;

    /// Get the default model for this provider
    fn default_model(&self) -> &str;
}
