// Provider-agnostic chat request/response types

use serde::{Deserialize, Serialize};

use crate::config::constants::DEFAULT_MAX_TOKENS;

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Unified request format for all providers
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    pub messages: Vec<ChatMessage>,

    /// Model name; empty means the provider's default
    pub model: String,

    pub max_tokens: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Ask the provider to constrain output to a JSON object
    #[serde(skip)]
    pub json_mode: bool,
}

impl ProviderRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            json_mode: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }
}

/// Unified response format
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    /// Concatenated text content
    pub text: String,
    pub stop_reason: Option<String>,
    /// Provider name (e.g., "openai", "groq")
    pub provider: String,
}
