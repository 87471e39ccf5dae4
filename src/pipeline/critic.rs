// Critic step: scores the current draft and counts the attempt

use std::sync::Arc;
use std::time::Duration;

use super::collaborators::{bounded, Critic, CritiqueRequest};
use super::parser::{decode, CriticOutput};
use super::types::{PipelineState, Round};

/// Aggregate score substituted when the critic response is unusable
pub const FALLBACK_SCORE: f64 = 5.0;

/// Critique substituted when the critic response cannot be decoded
pub const PARSE_FAILURE_CRITIQUE: &str =
    "Failed to parse critic output. Please refine model response.";

/// Reads `draft`, intent, tone and audience; writes `score`, `critique`,
/// `iteration_count` and appends to `rounds`.
pub struct CriticStep {
    critic: Arc<dyn Critic>,
    call_timeout: Duration,
}

impl CriticStep {
    pub fn new(critic: Arc<dyn Critic>, call_timeout: Duration) -> Self {
        Self {
            critic,
            call_timeout,
        }
    }

    pub async fn run(&self, state: &mut PipelineState) {
        tracing::info!("Starting critic");
        let draft = state.draft.clone().unwrap_or_default();
        let request = CritiqueRequest {
            post: draft.clone(),
            intent: state.request.intent.clone(),
            tone: state.request.tone.clone(),
            audience: state.request.audience.clone(),
        };

        let (score, critique, parsed) =
            match bounded(self.call_timeout, "critic", self.critic.critique(&request)).await {
                Ok(raw) => match decode::<CriticOutput>(&raw) {
                    Ok(out) => (out.mean_score(), out.suggestion, true),
                    Err(e) => {
                        tracing::warn!("Failed to decode critic output ({}); scoring {}", e, FALLBACK_SCORE);
                        (FALLBACK_SCORE, PARSE_FAILURE_CRITIQUE.to_string(), false)
                    }
                },
                Err(e) => {
                    tracing::warn!("Critic call failed ({:#}); scoring {}", e, FALLBACK_SCORE);
                    (FALLBACK_SCORE, format!("Critic unavailable: {:#}", e), false)
                }
            };

        // Counts attempts, not successful critiques
        state.iteration_count += 1;
        state.score = Some(score);
        state.critique = Some(critique.clone());
        state.rounds.push(Round {
            iteration: state.iteration_count,
            draft,
            score,
            critique,
            parsed,
        });

        tracing::info!(
            "Critic score: {:.2}, iteration: {}",
            score,
            state.iteration_count
        );
        if let Some(critique) = &state.critique {
            tracing::info!("Critique: {}", critique);
        }
    }
}
