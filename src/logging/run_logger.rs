// Run logger - one JSONL record per finished pipeline run

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::pipeline::{ContentKind, PipelineState, StopReason};

/// A single logged run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Unique ID for this run
    pub id: String,

    /// When the run finished
    pub timestamp: DateTime<Utc>,

    pub topic: String,

    pub kind: ContentKind,

    /// Final draft (empty if the writer never produced one)
    pub draft: String,

    pub score: Option<f64>,

    pub iteration_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl RunRecord {
    pub fn from_state(state: &PipelineState) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            topic: state.request.topic.clone(),
            kind: state.request.kind,
            draft: state.draft.clone().unwrap_or_default(),
            score: state.score,
            iteration_count: state.iteration_count,
            stop_reason: state.stop_reason,
        }
    }
}

/// Appends run records to a JSONL file
pub struct RunLogger {
    log_path: PathBuf,
}

impl RunLogger {
    /// Create a new logger, creating parent directories as needed
    pub fn new(log_path: PathBuf) -> Result<Self> {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Failed to create run log directory")?;
        }

        Ok(Self { log_path })
    }

    /// Append a record for `state`, returning its id
    pub fn record(&self, state: &PipelineState) -> Result<String> {
        let entry = RunRecord::from_state(state);
        let json = serde_json::to_string(&entry).context("Failed to serialize run record")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open run log {}", self.log_path.display()))?;
        writeln!(file, "{}", json).context("Failed to write run record")?;

        debug!("Logged run {} to {}", entry.id, self.log_path.display());
        Ok(entry.id)
    }

    /// Read every record back, skipping blank lines
    pub fn entries(&self) -> Result<Vec<RunRecord>> {
        let contents =
            std::fs::read_to_string(&self.log_path).context("Failed to read run log")?;

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).context("Failed to parse run record"))
            .collect()
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
