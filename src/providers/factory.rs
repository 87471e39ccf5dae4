// Provider factory
//
// Creates LLM providers and the full collaborator set from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use super::llm::{LlmAnalyzer, LlmCollaborator};
use super::openai::OpenAIProvider;
use super::retry::RetryPolicy;
use super::url_summarizer::UrlSummarizer;
use super::web_search::{SearchClient, WebResearcher};
use super::LlmProvider;
use crate::config::{Config, ProviderEntry, ProviderKind, Role};
use crate::pipeline::{Collaborators, Researcher};

/// Create an `LlmProvider` from a `ProviderEntry`.
pub fn create_provider_from_entry(entry: &ProviderEntry) -> Result<Arc<dyn LlmProvider>> {
    let api_key = entry.api_key.clone();
    let mut provider = match entry.kind {
        ProviderKind::Openai => OpenAIProvider::new_openai(api_key)?,
        ProviderKind::Mistral => OpenAIProvider::new_mistral(api_key)?,
        ProviderKind::Groq => OpenAIProvider::new_groq(api_key)?,
        ProviderKind::Gemini => OpenAIProvider::new_gemini(api_key)?,
    };

    if let Some(model) = &entry.model {
        provider = provider.with_model(model.clone());
    }
    if let Some(base_url) = &entry.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    if let Some(attempts) = entry.max_attempts {
        provider = provider.with_retry_policy(RetryPolicy::attempts(attempts));
    }

    Ok(Arc::new(provider))
}

fn collaborator_for(config: &Config, role: Role) -> Result<LlmCollaborator> {
    let entry = config
        .providers
        .for_role(role)
        .with_context(|| format!("No provider configured for the {} role", role.as_str()))?;
    let provider = create_provider_from_entry(entry)
        .with_context(|| format!("Failed to create {} provider", role.as_str()))?;

    tracing::debug!(
        "{} role uses {} ({})",
        role.as_str(),
        provider.name(),
        provider.default_model()
    );

    Ok(LlmCollaborator::new(provider).with_temperature(entry.temperature))
}

/// Web-search research when a search key is configured, model-only otherwise
fn researcher_for(config: &Config) -> Result<Arc<dyn Researcher>> {
    let llm = collaborator_for(config, Role::Research)?;
    let research = &config.research;

    let Some(api_key) = research.search_key() else {
        tracing::debug!("No search API key configured; research uses the model alone");
        return Ok(Arc::new(llm));
    };

    let search = SearchClient::new(
        api_key,
        research.search_base_url.clone(),
        research.max_results,
        Duration::from_secs(research.timeout_secs),
    )?;
    tracing::debug!("Research searches {}", research.search_base_url);
    Ok(Arc::new(WebResearcher::new(search, llm)))
}

/// Wire every collaborator the pipeline needs from configuration
pub fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let researcher = researcher_for(config)?;
    let writer = collaborator_for(config, Role::Writer)?;
    let critic = collaborator_for(config, Role::Critic)?;
    let vision = collaborator_for(config, Role::Vision)?;

    let summarizer = UrlSummarizer::new(
        config.url_summarizer.base_url.clone(),
        Duration::from_secs(config.url_summarizer.timeout_secs),
    )?;

    Ok(Collaborators {
        researcher,
        url_analyzer: Arc::new(summarizer),
        image_analyzer: Arc::new(LlmAnalyzer::image(vision.clone())),
        video_analyzer: Arc::new(LlmAnalyzer::video(vision)),
        writer: Arc::new(writer),
        critic: Arc::new(critic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;

    #[test]
    fn test_entry_overrides_apply() {
        let mut entry = ProviderEntry::new(ProviderKind::Groq, "gsk");
        entry.model = Some("llama-3.3-70b-versatile".to_string());

        let provider = create_provider_from_entry(&entry).unwrap();
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.default_model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_build_collaborators_from_default_entry() {
        let config = Config {
            providers: ProvidersConfig {
                default: Some(ProviderEntry::new(ProviderKind::Gemini, "g")),
                ..ProvidersConfig::default()
            },
            ..Config::default()
        };
        assert!(build_collaborators(&config).is_ok());
    }

    #[test]
    fn test_build_collaborators_with_search_key() {
        let mut config = Config {
            providers: ProvidersConfig {
                default: Some(ProviderEntry::new(ProviderKind::Groq, "gsk")),
                ..ProvidersConfig::default()
            },
            ..Config::default()
        };
        config.research.search_api_key = Some("tvly-key".to_string());

        assert!(researcher_for(&config).is_ok());
        assert!(build_collaborators(&config).is_ok());
    }

    #[test]
    fn test_missing_role_is_reported() {
        let config = Config {
            providers: ProvidersConfig {
                writer: Some(ProviderEntry::new(ProviderKind::Openai, "sk")),
                ..ProvidersConfig::default()
            },
            ..Config::default()
        };
        let err = build_collaborators(&config).err().unwrap();
        assert!(err.to_string().contains("research"));
    }
}
