// Configuration settings and structures

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::constants::{
    DEFAULT_SEARCH_BASE_URL, DEFAULT_SEARCH_MAX_RESULTS, DEFAULT_SEARCH_TIMEOUT_SECS,
    DEFAULT_SUMMARIZER_TIMEOUT_SECS, DEFAULT_URL_SUMMARIZER_URL,
};
use crate::pipeline::PipelineConfig;

/// Which OpenAI-compatible API a provider entry talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Openai,
    Mistral,
    Groq,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Openai => "openai",
            ProviderKind::Mistral => "mistral",
            ProviderKind::Groq => "groq",
            ProviderKind::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::Openai),
            "mistral" => Ok(ProviderKind::Mistral),
            "groq" => Ok(ProviderKind::Groq),
            "gemini" => Ok(ProviderKind::Gemini),
            other => bail!(
                "Invalid provider '{}'. Valid providers: openai, mistral, groq, gemini",
                other
            ),
        }
    }
}

/// A single provider entry.
///
/// ```toml
/// [providers.critic]
/// type = "mistral"
/// api_key = "..."
/// model = "devstral-small-2505"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEntry {
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    pub api_key: String,

    /// Optional model override (uses provider default if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Optional base URL (for custom endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Total attempts per call; absent means a single attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl ProviderEntry {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: None,
            base_url: None,
            temperature: None,
            max_attempts: None,
        }
    }

    fn validate(&self, role: &str) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!(
                "API key for providers.{} ({}) is empty\n\n\
                 Set it in ~/.quill/config.toml or export QUILL_API_KEY",
                role,
                self.kind
            );
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                bail!("providers.{}.temperature must be within 0.0..=2.0, got {}", role, t);
            }
        }
        if self.max_attempts == Some(0) {
            bail!("providers.{}.max_attempts must be at least 1", role);
        }
        Ok(())
    }
}

/// The roles a provider can fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Research,
    Writer,
    Critic,
    Vision,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Research => "research",
            Role::Writer => "writer",
            Role::Critic => "critic",
            Role::Vision => "vision",
        }
    }
}

/// Per-role provider entries; roles without an entry use `default`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ProviderEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<ProviderEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<ProviderEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critic: Option<ProviderEntry>,
    /// Image and video analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<ProviderEntry>,
}

impl ProvidersConfig {
    fn own_entry(&self, role: Role) -> Option<&ProviderEntry> {
        match role {
            Role::Research => self.research.as_ref(),
            Role::Writer => self.writer.as_ref(),
            Role::Critic => self.critic.as_ref(),
            Role::Vision => self.vision.as_ref(),
        }
    }

    /// Entry serving `role`, falling back to `default`
    pub fn for_role(&self, role: Role) -> Option<&ProviderEntry> {
        self.own_entry(role).or(self.default.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSummarizerConfig {
    #[serde(default = "default_summarizer_url")]
    pub base_url: String,
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
}

fn default_summarizer_url() -> String {
    DEFAULT_URL_SUMMARIZER_URL.to_string()
}

fn default_summarizer_timeout() -> u64 {
    DEFAULT_SUMMARIZER_TIMEOUT_SECS
}

impl Default for UrlSummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_summarizer_url(),
            timeout_secs: default_summarizer_timeout(),
        }
    }
}

/// Web search backing the research step.
///
/// Without `search_api_key`, research is answered by the model alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,
    #[serde(default = "default_search_url")]
    pub search_base_url: String,
    #[serde(default = "default_search_max_results")]
    pub max_results: u32,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_BASE_URL.to_string()
}

fn default_search_max_results() -> u32 {
    DEFAULT_SEARCH_MAX_RESULTS
}

fn default_search_timeout() -> u64 {
    DEFAULT_SEARCH_TIMEOUT_SECS
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            search_api_key: None,
            search_base_url: default_search_url(),
            max_results: default_search_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

impl ResearchConfig {
    /// Search key, if one is set and non-blank
    pub fn search_key(&self) -> Option<&str> {
        self.search_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if self.search_base_url.trim().is_empty() {
            bail!("research.search_base_url is empty");
        }
        if !(1..=20).contains(&self.max_results) {
            bail!(
                "research.max_results must be between 1 and 20 (got {})",
                self.max_results
            );
        }
        if self.timeout_secs == 0 {
            bail!("research.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// JSONL file receiving one record per finished run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_log: Option<PathBuf>,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub research: ResearchConfig,
    #[serde(default)]
    pub url_summarizer: UrlSummarizerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> Result<()> {
        self.pipeline
            .validate()
            .context("Invalid [pipeline] section")?;

        for role in [Role::Research, Role::Writer, Role::Critic, Role::Vision] {
            if self.providers.for_role(role).is_none() {
                bail!(
                    "No provider configured for the {} role\n\n\
                     Add [providers.default] (or [providers.{}]) to ~/.quill/config.toml,\n\
                     or export QUILL_API_KEY",
                    role.as_str(),
                    role.as_str()
                );
            }
        }

        let named = [
            ("default", &self.providers.default),
            ("research", &self.providers.research),
            ("writer", &self.providers.writer),
            ("critic", &self.providers.critic),
            ("vision", &self.providers.vision),
        ];
        for (role, entry) in named {
            if let Some(entry) = entry {
                entry.validate(role)?;
            }
        }

        self.research.validate()?;

        if self.url_summarizer.base_url.trim().is_empty() {
            bail!("url_summarizer.base_url is empty");
        }
        if self.url_summarizer.timeout_secs == 0 {
            bail!("url_summarizer.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        Config {
            providers: ProvidersConfig {
                default: Some(ProviderEntry::new(ProviderKind::Openai, "sk-test")),
                ..ProvidersConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_role_falls_back_to_default() {
        let mut config = configured();
        config.providers.critic = Some(ProviderEntry::new(ProviderKind::Mistral, "m-key"));

        assert_eq!(
            config.providers.for_role(Role::Critic).unwrap().kind,
            ProviderKind::Mistral
        );
        assert_eq!(
            config.providers.for_role(Role::Writer).unwrap().kind,
            ProviderKind::Openai
        );
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_every_role() {
        let mut config = Config::default();
        config.providers.writer = Some(ProviderEntry::new(ProviderKind::Gemini, "g"));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("research"));
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let mut config = configured();
        config.providers.vision = Some(ProviderEntry::new(ProviderKind::Gemini, "  "));

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("providers.vision"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = configured();
        if let Some(entry) = config.providers.default.as_mut() {
            entry.max_attempts = Some(0);
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pipeline() {
        let mut config = configured();
        config.pipeline.rewrite_budget = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.pipeline.score_threshold = 11.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_research_search_settings() {
        let mut config = configured();
        assert_eq!(config.research.search_key(), None);
        assert_eq!(config.research.search_base_url, "https://api.tavily.com");

        config.research.search_api_key = Some("  ".to_string());
        assert_eq!(config.research.search_key(), None);

        config.research.search_api_key = Some("tvly-abc".to_string());
        assert_eq!(config.research.search_key(), Some("tvly-abc"));
        assert!(config.validate().is_ok());

        config.research.max_results = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("research.max_results"));
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("Groq".parse::<ProviderKind>().unwrap(), ProviderKind::Groq);
        assert!("claude".parse::<ProviderKind>().is_err());
    }
}
