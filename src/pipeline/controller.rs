// Rewrite controller
//
// Analysis and research once, then Writer ↔ Critic until accepted or out of budget

use super::critic::CriticStep;
use super::dispatcher::ContentAnalysisDispatcher;
use super::research::ResearchStep;
use super::writer::WriterStep;
use super::collaborators::Collaborators;
use super::types::{GenerationRequest, PipelineConfig, PipelineState, StopReason};

/// States of the rewrite loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Kind-specific analysis (if any), then generic research (if still needed)
    ResearchOrAnalyze,
    Write,
    Critique,
    Terminate,
}

/// Decide where to go after a critique.
///
/// Rewrites while the score is unset or below the threshold AND rounds remain
/// in the budget. A score at or above the threshold always terminates.
pub fn next_after_critique(state: &PipelineState, config: &PipelineConfig) -> PipelineStage {
    let below_threshold = state
        .score
        .map_or(true, |score| score < config.score_threshold);

    if below_threshold && state.iteration_count < config.rewrite_budget {
        PipelineStage::Write
    } else {
        PipelineStage::Terminate
    }
}

/// Why a terminated state stopped
fn stop_reason(state: &PipelineState, config: &PipelineConfig) -> StopReason {
    match state.score {
        Some(score) if score >= config.score_threshold => StopReason::ScoreThreshold,
        _ => StopReason::BudgetExhausted,
    }
}

/// Drives one request through the pipeline.
///
/// Analysis and research run once; only the writer and critic repeat. The
/// controller is shareable across concurrent runs: each `run` owns its own
/// `PipelineState`.
pub struct RewriteController {
    dispatcher: ContentAnalysisDispatcher,
    research: ResearchStep,
    writer: WriterStep,
    critic: CriticStep,
    config: PipelineConfig,
}

impl RewriteController {
    pub fn new(collaborators: Collaborators, mut config: PipelineConfig) -> Self {
        if config.rewrite_budget == 0 {
            tracing::warn!("rewrite_budget of 0 would skip the critic entirely; using 1");
            config.rewrite_budget = 1;
        }
        let timeout = config.call_timeout();

        Self {
            dispatcher: ContentAnalysisDispatcher::new(&collaborators, timeout),
            research: ResearchStep::new(collaborators.researcher.clone(), timeout),
            writer: WriterStep::new(collaborators.writer.clone(), timeout),
            critic: CriticStep::new(collaborators.critic.clone(), timeout),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a request to completion.
    ///
    /// Always returns a complete state; collaborator failures degrade the
    /// result instead of aborting the run.
    pub async fn run(&self, request: GenerationRequest) -> PipelineState {
        tracing::info!(
            "Generating {} post about '{}' (budget {}, threshold {})",
            request.kind,
            request.topic,
            self.config.rewrite_budget,
            self.config.score_threshold
        );

        let mut state = PipelineState::new(request);
        let mut stage = PipelineStage::ResearchOrAnalyze;

        loop {
            stage = match stage {
                PipelineStage::ResearchOrAnalyze => {
                    self.dispatcher.dispatch(&mut state).await;
                    self.research.run(&mut state).await;
                    PipelineStage::Write
                }
                PipelineStage::Write => {
                    self.writer.run(&mut state).await;
                    PipelineStage::Critique
                }
                PipelineStage::Critique => {
                    self.critic.run(&mut state).await;
                    self.after_critique(&state)
                }
                PipelineStage::Terminate => break,
            };
        }

        let reason = stop_reason(&state, &self.config);
        match reason {
            StopReason::ScoreThreshold => tracing::info!(
                "Critique score ({:?}) reached {}. Done after {} iteration(s).",
                state.score,
                self.config.score_threshold,
                state.iteration_count
            ),
            StopReason::BudgetExhausted => tracing::info!(
                "Max rewrites ({}) reached. Ending despite score ({:?}).",
                self.config.rewrite_budget,
                state.score
            ),
        }
        state.stop_reason = Some(reason);
        state
    }

    fn after_critique(&self, state: &PipelineState) -> PipelineStage {
        let next = next_after_critique(state, &self.config);
        if next == PipelineStage::Write {
            tracing::info!(
                "Critique score ({:?}) is below {} or not set. Rewriting. Iteration: {}/{}",
                state.score,
                self.config.score_threshold,
                state.iteration_count,
                self.config.rewrite_budget
            );
        }
        next
    }
}

/// Mermaid flowchart of the state machine for a given configuration
pub fn mermaid(config: &PipelineConfig) -> String {
    format!(
        "flowchart TD\n\
         \x20   request([request]) --> dispatch{{content kind}}\n\
         \x20   dispatch -->|url| url_analyzer\n\
         \x20   dispatch -->|image| image_analyzer\n\
         \x20   dispatch -->|video| video_analyzer\n\
         \x20   dispatch -->|text / no locator| research\n\
         \x20   url_analyzer --> research\n\
         \x20   image_analyzer --> research\n\
         \x20   video_analyzer --> research\n\
         \x20   research --> writer\n\
         \x20   writer --> critic\n\
         \x20   critic -->|score < {threshold} and iteration < {budget}| writer\n\
         \x20   critic -->|otherwise| done([end])\n",
        threshold = config.score_threshold,
        budget = config.rewrite_budget,
    )
}
