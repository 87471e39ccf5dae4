// Scripted collaborators for unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::collaborators::{
    Collaborators, ContentAnalyzer, CritiqueRequest, Critic, Researcher, Writer, WriterBrief,
};

/// Replays canned responses in order, repeating the last one once exhausted
pub(crate) struct Script {
    responses: Vec<String>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl Script {
    pub(crate) fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, input: String) -> String {
        self.inputs.lock().unwrap().push(input);
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let idx = n.min(self.responses.len().saturating_sub(1));
        self.responses.get(idx).cloned().unwrap_or_default()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

pub(crate) struct ScriptedAnalyzer(pub(crate) Script);

impl ScriptedAnalyzer {
    pub(crate) fn new(response: &str) -> Self {
        Self(Script::new(&[response]))
    }
}

#[async_trait]
impl ContentAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, locator: &str) -> Result<String> {
        Ok(self.0.next(locator.to_string()))
    }
}

pub(crate) struct FailingAnalyzer;

#[async_trait]
impl ContentAnalyzer for FailingAnalyzer {
    async fn analyze(&self, _locator: &str) -> Result<String> {
        anyhow::bail!("connection refused")
    }
}

pub(crate) struct ScriptedResearcher(pub(crate) Script);

#[async_trait]
impl Researcher for ScriptedResearcher {
    async fn research(&self, query: &str) -> Result<String> {
        Ok(self.0.next(query.to_string()))
    }
}

/// Records each brief as JSON
pub(crate) struct ScriptedWriter(pub(crate) Script);

#[async_trait]
impl Writer for ScriptedWriter {
    async fn write(&self, brief: &WriterBrief) -> Result<String> {
        Ok(self.0.next(serde_json::to_string(brief)?))
    }
}

pub(crate) struct FailingWriter;

#[async_trait]
impl Writer for FailingWriter {
    async fn write(&self, _brief: &WriterBrief) -> Result<String> {
        anyhow::bail!("writer service returned 503")
    }
}

/// Records each draft it was asked to score
pub(crate) struct ScriptedCritic(pub(crate) Script);

#[async_trait]
impl Critic for ScriptedCritic {
    async fn critique(&self, request: &CritiqueRequest) -> Result<String> {
        Ok(self.0.next(request.post.clone()))
    }
}

pub(crate) struct FailingCritic;

#[async_trait]
impl Critic for FailingCritic {
    async fn critique(&self, _request: &CritiqueRequest) -> Result<String> {
        anyhow::bail!("critic service unreachable")
    }
}

pub(crate) fn critic_json(clarity: i64, tone: i64, engagement: i64, relevance: i64) -> String {
    format!(
        r#"{{"clarity":{},"tone":{},"engagement":{},"relevance":{},"suggestion":"Add a concrete example."}}"#,
        clarity, tone, engagement, relevance
    )
}

/// Well-behaved collaborators that accept the first draft
pub(crate) fn scripted_collaborators() -> Collaborators {
    let critic = critic_json(8, 8, 8, 8);
    Collaborators {
        researcher: Arc::new(ScriptedResearcher(Script::new(&[
            r#"{"summary":"Background research."}"#,
        ]))),
        url_analyzer: Arc::new(ScriptedAnalyzer::new(
            r#"{"summary":"Article summary","main_points":["a","b"],"tone_of_source":"Informative"}"#,
        )),
        image_analyzer: Arc::new(ScriptedAnalyzer::new(
            r#"{"description":"Image description","key_elements":["x"],"sentiment":"calm"}"#,
        )),
        video_analyzer: Arc::new(ScriptedAnalyzer::new(
            r#"{"summary":"Video summary","key_moments":["intro"],"sentiment":"upbeat"}"#,
        )),
        writer: Arc::new(ScriptedWriter(Script::new(&[r#"{"content":"Draft post"}"#]))),
        critic: Arc::new(ScriptedCritic(Script::new(&[critic.as_str()]))),
    }
}
