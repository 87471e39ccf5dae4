// Content-analysis dispatch: one analyzer per declared content kind

use std::sync::Arc;
use std::time::Duration;

use super::collaborators::{bounded, Collaborators, ContentAnalyzer};
use super::parser::{decode_or_else, StructuredOutput};
use super::types::{
    AnalysisResult, ContentKind, ImageAnalysis, PipelineState, UrlAnalysis, VideoAnalysis,
    ERROR_TONE, UNKNOWN_TONE,
};

/// Picks and invokes the analysis collaborator for a request's content kind.
///
/// Reads `request.kind` and `request.source`; writes `analysis` and
/// `research_summary`. Text requests, and requests without a locator, pass
/// through untouched.
pub struct ContentAnalysisDispatcher {
    url: Arc<dyn ContentAnalyzer>,
    image: Arc<dyn ContentAnalyzer>,
    video: Arc<dyn ContentAnalyzer>,
    call_timeout: Duration,
}

impl ContentAnalysisDispatcher {
    pub fn new(collaborators: &Collaborators, call_timeout: Duration) -> Self {
        Self {
            url: Arc::clone(&collaborators.url_analyzer),
            image: Arc::clone(&collaborators.image_analyzer),
            video: Arc::clone(&collaborators.video_analyzer),
            call_timeout,
        }
    }

    pub async fn dispatch(&self, state: &mut PipelineState) {
        let kind = state.request.kind;
        let Some(locator) = state.locator().map(str::to_string) else {
            if kind.needs_analysis() {
                tracing::info!("No locator provided for {} analysis, skipping", kind);
            }
            return;
        };

        let result = match kind {
            ContentKind::Text => return,
            ContentKind::Url => AnalysisResult::Url(
                self.analyze(self.url.as_ref(), kind, &locator, UrlAnalysis::failed)
                    .await,
            ),
            ContentKind::Image => AnalysisResult::Image(
                self.analyze(self.image.as_ref(), kind, &locator, ImageAnalysis::failed)
                    .await,
            ),
            ContentKind::Video => AnalysisResult::Video(
                self.analyze(self.video.as_ref(), kind, &locator, VideoAnalysis::failed)
                    .await,
            ),
        };

        tracing::info!(
            "{} analysis complete (tone: {}): {}",
            kind,
            result.tone(),
            preview(result.summary())
        );
        state.research_summary = Some(result.summary().to_string());
        state.analysis = Some(result);
    }

    /// Call one analyzer and decode its output, falling back on any failure.
    ///
    /// `failed` builds the fallback from the locator and a tone sentinel:
    /// `ERROR_TONE` when the call itself failed, `UNKNOWN_TONE` when the
    /// response could not be decoded.
    async fn analyze<T, F>(
        &self,
        analyzer: &dyn ContentAnalyzer,
        kind: ContentKind,
        locator: &str,
        failed: F,
    ) -> T
    where
        T: StructuredOutput,
        F: Fn(&str, &str) -> T,
    {
        tracing::info!("Starting {} analysis for: {}", kind, locator);
        let label = format!("{} analysis", kind);
        match bounded(self.call_timeout, &label, analyzer.analyze(locator)).await {
            Ok(raw) => decode_or_else(&raw, &label, |_| failed(locator, UNKNOWN_TONE)),
            Err(e) => {
                tracing::warn!("{} failed for {}: {:#}", label, locator, e);
                failed(locator, ERROR_TONE)
            }
        }
    }
}

/// First 100 characters, for log lines
pub(crate) fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(100).collect();
    if text.chars().count() > 100 {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{scripted_collaborators, FailingAnalyzer, ScriptedAnalyzer};
    use crate::pipeline::types::GenerationRequest;

    fn request(kind: ContentKind, source: Option<&str>) -> PipelineState {
        let mut request = GenerationRequest::new("AI", "desc", "warm", "founders", "inform")
            .with_kind(kind);
        request.source = source.map(str::to_string);
        PipelineState::new(request)
    }

    #[tokio::test]
    async fn test_text_kind_is_noop() {
        let collaborators = scripted_collaborators();
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        let mut state = request(ContentKind::Text, Some("https://ignored.test"));
        let before = state.clone();

        dispatcher.dispatch(&mut state).await;
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn test_missing_locator_is_noop() {
        let collaborators = scripted_collaborators();
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        for kind in [ContentKind::Url, ContentKind::Image, ContentKind::Video] {
            let mut state = request(kind, None);
            dispatcher.dispatch(&mut state).await;
            assert!(state.analysis.is_none());
            assert!(state.research_summary.is_none());
        }
    }

    #[tokio::test]
    async fn test_image_analysis_sets_result_and_summary() {
        let mut collaborators = scripted_collaborators();
        collaborators.image_analyzer = Arc::new(ScriptedAnalyzer::new(
            r#"```json
{"description":"Engineers pairing at a desk","key_elements":["laptop","coffee"],"sentiment":"collaborative"}
```"#,
        ));
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        let mut state = request(ContentKind::Image, Some("team.png"));

        dispatcher.dispatch(&mut state).await;

        match state.analysis.as_ref() {
            Some(AnalysisResult::Image(image)) => {
                assert_eq!(image.key_elements, vec!["laptop", "coffee"]);
                assert_eq!(image.sentiment, "collaborative");
            }
            other => panic!("Expected image analysis, got {:?}", other),
        }
        assert_eq!(
            state.research_summary.as_deref(),
            Some("Engineers pairing at a desk")
        );
    }

    #[tokio::test]
    async fn test_unreachable_url_falls_back_with_error_tone() {
        let mut collaborators = scripted_collaborators();
        collaborators.url_analyzer = Arc::new(FailingAnalyzer);
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        let mut state = request(ContentKind::Url, Some("https://down.test/a"));

        dispatcher.dispatch(&mut state).await;

        let analysis = state.analysis.as_ref().expect("fallback analysis");
        assert_eq!(analysis.tone(), ERROR_TONE);
        assert_eq!(
            analysis.summary(),
            "Failed to retrieve content from https://down.test/a."
        );
        assert_eq!(state.research_summary.as_deref(), Some(analysis.summary()));
    }

    #[tokio::test]
    async fn test_malformed_video_output_falls_back_with_unknown_sentiment() {
        let mut collaborators = scripted_collaborators();
        collaborators.video_analyzer = Arc::new(ScriptedAnalyzer::new("I could not watch it."));
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        let mut state = request(ContentKind::Video, Some("demo.mp4"));

        dispatcher.dispatch(&mut state).await;

        match state.analysis.as_ref() {
            Some(AnalysisResult::Video(video)) => {
                assert_eq!(video.sentiment, UNKNOWN_TONE);
                assert!(video.key_moments.is_empty());
                assert!(video.summary.contains("demo.mp4"));
            }
            other => panic!("Expected video analysis, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_image_output_missing_list_falls_back() {
        let mut collaborators = scripted_collaborators();
        collaborators.image_analyzer = Arc::new(ScriptedAnalyzer::new(
            r#"{"description":"A desk","sentiment":"calm"}"#,
        ));
        let dispatcher = ContentAnalysisDispatcher::new(&collaborators, Duration::from_secs(5));
        let mut state = request(ContentKind::Image, Some("desk.png"));

        dispatcher.dispatch(&mut state).await;

        let analysis = state.analysis.as_ref().expect("fallback analysis");
        assert_eq!(analysis.tone(), UNKNOWN_TONE);
        assert_eq!(analysis.summary(), "Failed to analyze image from desk.png.");
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(150);
        assert_eq!(preview(&long).len(), 103);
    }
}
