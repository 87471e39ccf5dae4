// Pipeline types: request, shared state, analysis payloads and loop configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_REWRITE_BUDGET, DEFAULT_SCORE_THRESHOLD, DEFAULT_WORD_LIMIT,
};

/// Tone/sentiment sentinel used when an analysis collaborator could not be reached
pub const ERROR_TONE: &str = "Error";

/// Tone/sentiment sentinel used when an analysis response could not be decoded
pub const UNKNOWN_TONE: &str = "Unknown";

/// What kind of source material accompanies a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Text,
    Url,
    Image,
    Video,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Url => "url",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
        }
    }

    /// Whether this kind is analyzed before writing (url, image, video)
    pub fn needs_analysis(&self) -> bool {
        !matches!(self, ContentKind::Text)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ContentKind::Text),
            "url" => Ok(ContentKind::Url),
            "image" => Ok(ContentKind::Image),
            "video" => Ok(ContentKind::Video),
            other => anyhow::bail!(
                "Unknown content kind '{}' (expected text, url, image or video)",
                other
            ),
        }
    }
}

fn default_word_limit() -> u32 {
    DEFAULT_WORD_LIMIT
}

/// Immutable input for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    #[serde(default)]
    pub description: String,
    pub tone: String,
    pub audience: String,
    pub intent: String,
    #[serde(default = "default_word_limit")]
    pub word_limit: u32,
    #[serde(rename = "type", default)]
    pub kind: ContentKind,
    /// URL or path of the source material, when `kind` is not text
    #[serde(rename = "url", alias = "source", default)]
    pub source: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        topic: impl Into<String>,
        description: impl Into<String>,
        tone: impl Into<String>,
        audience: impl Into<String>,
        intent: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            description: description.into(),
            tone: tone.into(),
            audience: audience.into(),
            intent: intent.into(),
            word_limit: DEFAULT_WORD_LIMIT,
            kind: ContentKind::Text,
            source: None,
        }
    }

    pub fn with_word_limit(mut self, word_limit: u32) -> Self {
        self.word_limit = word_limit;
        self
    }

    /// Attach source material of the given kind
    pub fn with_source(mut self, kind: ContentKind, source: impl Into<String>) -> Self {
        self.kind = kind;
        self.source = Some(source.into());
        self
    }

    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = kind;
        self
    }

    /// The source locator, ignoring blank values
    pub fn locator(&self) -> Option<&str> {
        self.source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Result of analyzing a linked article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub summary: String,
    pub main_points: Vec<String>,
    pub tone_of_source: String,
}

impl UrlAnalysis {
    pub fn failed(locator: &str, tone: &str) -> Self {
        Self {
            summary: format!("Failed to retrieve content from {}.", locator),
            main_points: Vec::new(),
            tone_of_source: tone.to_string(),
        }
    }
}

/// Result of analyzing an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub description: String,
    pub key_elements: Vec<String>,
    pub sentiment: String,
}

impl ImageAnalysis {
    pub fn failed(locator: &str, sentiment: &str) -> Self {
        Self {
            description: format!("Failed to analyze image from {}.", locator),
            key_elements: Vec::new(),
            sentiment: sentiment.to_string(),
        }
    }
}

/// Result of analyzing a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub summary: String,
    pub key_moments: Vec<String>,
    pub sentiment: String,
}

impl VideoAnalysis {
    pub fn failed(locator: &str, sentiment: &str) -> Self {
        Self {
            summary: format!("Failed to analyze video from {}.", locator),
            key_moments: Vec::new(),
            sentiment: sentiment.to_string(),
        }
    }
}

/// Kind-specific analysis payload; at most one per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalysisResult {
    Url(UrlAnalysis),
    Image(ImageAnalysis),
    Video(VideoAnalysis),
}

impl AnalysisResult {
    pub fn kind(&self) -> ContentKind {
        match self {
            AnalysisResult::Url(_) => ContentKind::Url,
            AnalysisResult::Image(_) => ContentKind::Image,
            AnalysisResult::Video(_) => ContentKind::Video,
        }
    }

    /// The free-text field copied into `research_summary`
    pub fn summary(&self) -> &str {
        match self {
            AnalysisResult::Url(a) => &a.summary,
            AnalysisResult::Image(a) => &a.description,
            AnalysisResult::Video(a) => &a.summary,
        }
    }

    /// Tone of the source (url) or overall sentiment (image, video)
    pub fn tone(&self) -> &str {
        match self {
            AnalysisResult::Url(a) => &a.tone_of_source,
            AnalysisResult::Image(a) => &a.sentiment,
            AnalysisResult::Video(a) => &a.sentiment,
        }
    }
}

/// One Writer → Critic round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub iteration: u32,
    pub draft: String,
    pub score: f64,
    pub critique: String,
    /// false when the critic response fell back to the default score
    pub parsed: bool,
}

/// Why the rewrite loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The critic score reached the threshold
    ScoreThreshold,
    /// The rewrite budget ran out before the threshold was reached
    BudgetExhausted,
}

/// The record threaded through every step of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    #[serde(flatten)]
    pub request: GenerationRequest,
    pub research_summary: Option<String>,
    pub analysis: Option<AnalysisResult>,
    pub draft: Option<String>,
    pub score: Option<f64>,
    pub critique: Option<String>,
    pub iteration_count: u32,
    #[serde(default)]
    pub rounds: Vec<Round>,
    pub stop_reason: Option<StopReason>,
}

impl PipelineState {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            research_summary: None,
            analysis: None,
            draft: None,
            score: None,
            critique: None,
            iteration_count: 0,
            rounds: Vec::new(),
            stop_reason: None,
        }
    }

    pub fn locator(&self) -> Option<&str> {
        self.request.locator()
    }

    /// The analysis result, only if it matches the declared kind
    pub fn analysis_for_kind(&self) -> Option<&AnalysisResult> {
        self.analysis
            .as_ref()
            .filter(|a| a.kind() == self.request.kind)
    }
}

fn default_rewrite_budget() -> u32 {
    DEFAULT_REWRITE_BUDGET
}

fn default_score_threshold() -> f64 {
    DEFAULT_SCORE_THRESHOLD
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

/// Configuration for the rewrite loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of Writer → Critic rounds
    #[serde(default = "default_rewrite_budget")]
    pub rewrite_budget: u32,
    /// Aggregate critic score at or above which the draft is accepted
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    /// Upper bound on each collaborator call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rewrite_budget == 0 {
            anyhow::bail!("pipeline.rewrite_budget must be at least 1");
        }
        if !(1.0..=10.0).contains(&self.score_threshold) {
            anyhow::bail!(
                "pipeline.score_threshold must lie in 1..=10 (got {})",
                self.score_threshold
            );
        }
        if self.call_timeout_secs == 0 {
            anyhow::bail!("pipeline.call_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rewrite_budget: DEFAULT_REWRITE_BUDGET,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_original_field_names() {
        let json = r#"{
            "topic": "AI in hiring",
            "description": "Resume parsers are everywhere",
            "tone": "Professional",
            "audience": "Recruiters",
            "intent": "Inform",
            "type": "url",
            "url": "https://example.com/post"
        }"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, ContentKind::Url);
        assert_eq!(request.word_limit, 250);
        assert_eq!(request.locator(), Some("https://example.com/post"));
    }

    #[test]
    fn test_request_defaults_to_text_kind() {
        let json = r#"{"topic":"t","tone":"x","audience":"a","intent":"i"}"#;
        let request: GenerationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, ContentKind::Text);
        assert_eq!(request.description, "");
        assert!(request.locator().is_none());
    }

    #[test]
    fn test_blank_locator_is_ignored() {
        let request = GenerationRequest::new("t", "d", "x", "a", "i")
            .with_source(ContentKind::Image, "   ");
        assert!(request.locator().is_none());
    }

    #[test]
    fn test_content_kind_from_str() {
        assert_eq!("VIDEO".parse::<ContentKind>().unwrap(), ContentKind::Video);
        assert!("podcast".parse::<ContentKind>().is_err());
        assert!(!ContentKind::Text.needs_analysis());
        assert!(ContentKind::Url.needs_analysis());
    }

    #[test]
    fn test_analysis_result_accessors() {
        let analysis = AnalysisResult::Image(ImageAnalysis {
            description: "A team at a whiteboard".to_string(),
            key_elements: vec!["whiteboard".to_string()],
            sentiment: "collaborative".to_string(),
        });
        assert_eq!(analysis.kind(), ContentKind::Image);
        assert_eq!(analysis.summary(), "A team at a whiteboard");
        assert_eq!(analysis.tone(), "collaborative");
    }

    #[test]
    fn test_analysis_for_kind_rejects_mismatch() {
        let request = GenerationRequest::new("t", "d", "x", "a", "i")
            .with_source(ContentKind::Video, "clip.mp4");
        let mut state = PipelineState::new(request);
        state.analysis = Some(AnalysisResult::Url(UrlAnalysis::failed("x", ERROR_TONE)));
        assert!(state.analysis_for_kind().is_none());
    }

    #[test]
    fn test_failed_analysis_shapes() {
        let url = UrlAnalysis::failed("https://x.test", ERROR_TONE);
        assert_eq!(url.summary, "Failed to retrieve content from https://x.test.");
        assert!(url.main_points.is_empty());
        assert_eq!(url.tone_of_source, "Error");

        let video = VideoAnalysis::failed("clip.mp4", UNKNOWN_TONE);
        assert!(video.summary.contains("clip.mp4"));
        assert_eq!(video.sentiment, "Unknown");
    }

    #[test]
    fn test_state_serializes_flat_request_fields() {
        let state = PipelineState::new(GenerationRequest::new("t", "d", "x", "a", "i"));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["topic"], "t");
        assert_eq!(value["type"], "text");
        assert_eq!(value["iteration_count"], 0);
    }

    #[test]
    fn test_pipeline_config_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.rewrite_budget, 3);
        assert!((cfg.score_threshold - 7.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_pipeline_config_validation() {
        let cfg = PipelineConfig {
            rewrite_budget: 0,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = PipelineConfig {
            score_threshold: 11.0,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
