// Writer step: drafts (and redrafts) the post

use std::sync::Arc;
use std::time::Duration;

use super::collaborators::{bounded, Writer, WriterBrief};
use super::parser::{decode_or_else, WriterOutput};
use super::types::{AnalysisResult, PipelineState};

/// Research placeholder used when nothing upstream produced a summary
pub const NO_RESEARCH: &str = "No external research or content analysis available.";

/// Reads the request, `analysis` and `research_summary`; writes `draft` only.
pub struct WriterStep {
    writer: Arc<dyn Writer>,
    call_timeout: Duration,
}

impl WriterStep {
    pub fn new(writer: Arc<dyn Writer>, call_timeout: Duration) -> Self {
        Self {
            writer,
            call_timeout,
        }
    }

    pub async fn run(&self, state: &mut PipelineState) {
        tracing::info!("Starting writer (iteration {})", state.iteration_count + 1);
        let brief = writer_brief(state);

        match bounded(self.call_timeout, "writer", self.writer.write(&brief)).await {
            Ok(raw) => {
                // Unparsed text is still a usable draft; the critic judges it
                let draft = decode_or_else(&raw, "writer", |_| WriterOutput {
                    content: raw.trim().to_string(),
                })
                .content;
                state.draft = Some(draft);
            }
            Err(e) => {
                tracing::warn!("Writer call failed, keeping previous draft: {:#}", e);
                if state.draft.is_none() {
                    state.draft = Some(String::new());
                }
            }
        }
    }
}

/// Build the writer's context bundle from the current state.
///
/// When an analysis matching the declared kind exists, the research summary
/// and description are rewritten to cite its fields explicitly.
pub fn writer_brief(state: &PipelineState) -> WriterBrief {
    let request = &state.request;
    let source = state.locator().unwrap_or("the supplied source");

    let (research_summary, description) = match state.analysis_for_kind() {
        Some(AnalysisResult::Url(url)) => (
            format!(
                "Key insights from the linked article: {}. Main points include: {}. \
                 The original source's tone is {}.",
                url.summary,
                url.main_points.join(", "),
                url.tone_of_source
            ),
            format!("{}. Based on the content from {}.", request.description, source),
        ),
        Some(AnalysisResult::Image(image)) => (
            format!(
                "Image analysis: {}. Key elements: {}. Overall sentiment: {}.",
                image.description,
                image.key_elements.join(", "),
                image.sentiment
            ),
            format!("{}. Based on the image at {}.", request.description, source),
        ),
        Some(AnalysisResult::Video(video)) => (
            format!(
                "Video analysis summary: {}. Key moments: {}. Overall sentiment: {}.",
                video.summary,
                video.key_moments.join(", "),
                video.sentiment
            ),
            format!("{}. Based on the video at {}.", request.description, source),
        ),
        None => (
            state
                .research_summary
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| NO_RESEARCH.to_string()),
            request.description.clone(),
        ),
    };

    WriterBrief {
        topic: request.topic.clone(),
        description,
        research_summary,
        tone: request.tone.clone(),
        audience: request.audience.clone(),
        intent: request.intent.clone(),
        word_limit: request.word_limit,
    }
}
