// Collaborator seams: the external services each step calls
//
// Every collaborator returns raw text; steps run it through the parser.
// Implementations must be safe to share between concurrent runs.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Produces background research for a free-text query
#[async_trait]
pub trait Researcher: Send + Sync {
    async fn research(&self, query: &str) -> Result<String>;
}

/// Analyzes one kind of source material given its locator (URL or path)
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    async fn analyze(&self, locator: &str) -> Result<String>;
}

/// Drafts a post from a writer brief
#[async_trait]
pub trait Writer: Send + Sync {
    async fn write(&self, brief: &WriterBrief) -> Result<String>;
}

/// Scores a draft
#[async_trait]
pub trait Critic: Send + Sync {
    async fn critique(&self, request: &CritiqueRequest) -> Result<String>;
}

/// Context bundle handed to the writer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriterBrief {
    pub topic: String,
    pub description: String,
    pub research_summary: String,
    pub tone: String,
    pub audience: String,
    pub intent: String,
    pub word_limit: u32,
}

/// Input handed to the critic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueRequest {
    pub post: String,
    pub intent: String,
    pub tone: String,
    pub audience: String,
}

/// The full set of collaborators one controller needs
#[derive(Clone)]
pub struct Collaborators {
    pub researcher: Arc<dyn Researcher>,
    pub url_analyzer: Arc<dyn ContentAnalyzer>,
    pub image_analyzer: Arc<dyn ContentAnalyzer>,
    pub video_analyzer: Arc<dyn ContentAnalyzer>,
    pub writer: Arc<dyn Writer>,
    pub critic: Arc<dyn Critic>,
}

/// Await a collaborator call, treating an elapsed `limit` as a failure.
pub(crate) async fn bounded<T, F>(limit: Duration, label: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => anyhow::bail!("{} call timed out after {:?}", label, limit),
    }
}
