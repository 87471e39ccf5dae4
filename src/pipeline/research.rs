// Research step: generic background summary for the writer

use std::sync::Arc;
use std::time::Duration;

use super::collaborators::{bounded, Researcher};
use super::dispatcher::preview;
use super::parser::{decode_or_else, ResearchOutput};
use super::types::{GenerationRequest, PipelineState};

/// Reads topic/description/tone; writes `research_summary`.
///
/// Never overwrites a summary that a kind-specific analysis already set.
pub struct ResearchStep {
    researcher: Arc<dyn Researcher>,
    call_timeout: Duration,
}

impl ResearchStep {
    pub fn new(researcher: Arc<dyn Researcher>, call_timeout: Duration) -> Self {
        Self {
            researcher,
            call_timeout,
        }
    }

    pub async fn run(&self, state: &mut PipelineState) {
        if state.research_summary.is_some() && state.request.kind.needs_analysis() {
            tracing::info!(
                "Skipping general research: {} analysis is available",
                state.request.kind
            );
            return;
        }

        tracing::info!("Starting general research");
        let query = research_query(&state.request);

        let summary = match bounded(self.call_timeout, "research", self.researcher.research(&query))
            .await
        {
            Ok(raw) => {
                decode_or_else(&raw, "research", |_| ResearchOutput {
                    summary: unusable_research(&raw),
                })
                .summary
            }
            Err(e) => {
                tracing::warn!("Research call failed: {:#}", e);
                unusable_research(&format!("{:#}", e))
            }
        };

        tracing::info!("Research summary: {}", preview(&summary));
        state.research_summary = Some(summary);
    }
}

/// Query sent to the research collaborator
pub fn research_query(request: &GenerationRequest) -> String {
    format!(
        "{topic}: {description}\n\n\
         Gather recent insights and examples related to the topic, then summarize \
         the findings in 2-3 sentences suitable for a LinkedIn post. \
         Avoid links; focus on facts, stats, or tool names where possible. \
         Use a {tone} tone.\n\n\
         Respond in this JSON format:\n\
         {{\"summary\": \"<summary>\"}}",
        topic = request.topic,
        description = request.description,
        tone = request.tone,
    )
}

fn unusable_research(raw: &str) -> String {
    format!("Could not generate a good research summary. Raw: {}", raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{Script, ScriptedResearcher};
    use crate::pipeline::types::{AnalysisResult, ContentKind, UrlAnalysis};
    use anyhow::Result;
    use async_trait::async_trait;

    struct DownResearcher;

    #[async_trait]
    impl Researcher for DownResearcher {
        async fn research(&self, _query: &str) -> Result<String> {
            anyhow::bail!("search API quota exceeded")
        }
    }

    fn text_state() -> PipelineState {
        PipelineState::new(GenerationRequest::new(
            "Remote work",
            "Hybrid teams in 2025",
            "optimistic",
            "managers",
            "spark discussion",
        ))
    }

    #[tokio::test]
    async fn test_research_sets_summary() {
        let researcher = Arc::new(ScriptedResearcher(Script::new(&[
            "```json\n{\"summary\": \"Hybrid adoption keeps rising.\"}\n```",
        ])));
        let step = ResearchStep::new(researcher.clone(), Duration::from_secs(5));
        let mut state = text_state();

        step.run(&mut state).await;

        assert_eq!(
            state.research_summary.as_deref(),
            Some("Hybrid adoption keeps rising.")
        );
        let query = &researcher.0.inputs()[0];
        assert!(query.contains("Remote work: Hybrid teams in 2025"));
        assert!(query.contains("optimistic tone"));
    }

    #[tokio::test]
    async fn test_research_skipped_when_analysis_present() {
        let researcher = Arc::new(ScriptedResearcher(Script::new(&[
            r#"{"summary":"generic"}"#,
        ])));
        let step = ResearchStep::new(researcher.clone(), Duration::from_secs(5));
        let mut state = text_state();
        state.request.kind = ContentKind::Url;
        state.analysis = Some(AnalysisResult::Url(UrlAnalysis {
            summary: "Specific article facts".to_string(),
            main_points: vec![],
            tone_of_source: "Informative".to_string(),
        }));
        state.research_summary = Some("Specific article facts".to_string());

        step.run(&mut state).await;

        assert_eq!(researcher.0.calls(), 0);
        assert_eq!(
            state.research_summary.as_deref(),
            Some("Specific article facts")
        );
    }

    #[tokio::test]
    async fn test_research_malformed_output_embeds_raw_text() {
        let researcher = Arc::new(ScriptedResearcher(Script::new(&[
            "Agent stopped due to iteration limit.",
        ])));
        let step = ResearchStep::new(researcher, Duration::from_secs(5));
        let mut state = text_state();

        step.run(&mut state).await;

        assert_eq!(
            state.research_summary.as_deref(),
            Some("Could not generate a good research summary. Raw: Agent stopped due to iteration limit.")
        );
    }

    #[tokio::test]
    async fn test_research_transport_failure_never_blocks() {
        let step = ResearchStep::new(Arc::new(DownResearcher), Duration::from_secs(5));
        let mut state = text_state();

        step.run(&mut state).await;

        let summary = state.research_summary.unwrap();
        assert!(summary.starts_with("Could not generate a good research summary."));
        assert!(summary.contains("quota exceeded"));
    }
}
