// LLM-backed collaborators
//
// Wraps an `LlmProvider` so it can stand in for the researcher, writer,
// critic and the image/video analyzers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::prompts::{
    critic_prompt, image_prompt, video_prompt, writer_prompt, JSON_ONLY_SYSTEM, RESEARCH_SYSTEM,
};
use super::types::{ChatMessage, ProviderRequest};
use super::LlmProvider;
use crate::pipeline::{ContentAnalyzer, Critic, CritiqueRequest, Researcher, Writer, WriterBrief};

/// One provider plus the sampling settings for the role it plays
#[derive(Clone)]
pub struct LlmCollaborator {
    provider: Arc<dyn LlmProvider>,
    temperature: Option<f32>,
}

impl LlmCollaborator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub(crate) async fn complete(&self, system: &str, prompt: String) -> Result<String> {
        let mut request =
            ProviderRequest::new(vec![ChatMessage::system(system), ChatMessage::user(prompt)])
                .with_json_mode(true);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let response = self
            .provider
            .send_message(&request)
            .await
            .with_context(|| format!("{} completion failed", self.provider.name()))?;

        tracing::debug!(
            "{} reply {} from {} (stop: {})",
            response.provider,
            response.id,
            response.model,
            response.stop_reason.as_deref().unwrap_or("unknown")
        );
        Ok(response.text)
    }
}

#[async_trait]
impl Researcher for LlmCollaborator {
    async fn research(&self, query: &str) -> Result<String> {
        self.complete(RESEARCH_SYSTEM, query.to_string()).await
    }
}

#[async_trait]
impl Writer for LlmCollaborator {
    async fn write(&self, brief: &WriterBrief) -> Result<String> {
        self.complete(JSON_ONLY_SYSTEM, writer_prompt(brief)).await
    }
}

#[async_trait]
impl Critic for LlmCollaborator {
    async fn critique(&self, request: &CritiqueRequest) -> Result<String> {
        self.complete(JSON_ONLY_SYSTEM, critic_prompt(request)).await
    }
}

/// Image or video analysis through an LLM
#[derive(Clone)]
pub struct LlmAnalyzer {
    llm: LlmCollaborator,
    prompt: fn(&str) -> String,
}

impl LlmAnalyzer {
    pub fn image(llm: LlmCollaborator) -> Self {
        Self {
            llm,
            prompt: image_prompt,
        }
    }

    pub fn video(llm: LlmCollaborator) -> Self {
        Self {
            llm,
            prompt: video_prompt,
        }
    }
}

#[async_trait]
impl ContentAnalyzer for LlmAnalyzer {
    async fn analyze(&self, locator: &str) -> Result<String> {
        self.llm.complete(JSON_ONLY_SYSTEM, (self.prompt)(locator)).await
    }
}
