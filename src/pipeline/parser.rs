// Structured-output parsing (model text → strict result shapes)
//
// Models are asked for bare JSON but routinely wrap it in markdown fences or
// chatty preambles. Everything here strips that wrapping, decodes into a typed
// shape, and validates per-field constraints. Call sites choose their own
// fallback value; nothing in this module panics on bad input.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::types::{ImageAnalysis, UrlAnalysis, VideoAnalysis};

/// First fenced block, with an optional language tag (```json, ```JSON, ```)
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("fence regex"));

/// Why a model response could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("model output was empty")]
    Empty,

    #[error("malformed {shape} output: {source}")]
    Syntax {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// A result shape a model response can be decoded into
pub trait StructuredOutput: DeserializeOwned {
    /// Shape name used in logs and errors
    const SHAPE: &'static str;

    /// Per-field constraints beyond what serde enforces
    fn validate(&self) -> Result<(), DecodeError> {
        Ok(())
    }
}

/// Research collaborator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutput {
    pub summary: String,
}

impl StructuredOutput for ResearchOutput {
    const SHAPE: &'static str = "research";
}

/// Writer collaborator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterOutput {
    pub content: String,
}

impl StructuredOutput for WriterOutput {
    const SHAPE: &'static str = "writer";
}

/// Critic collaborator output: four sub-scores in 1..=10 and one suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticOutput {
    #[serde(deserialize_with = "whole_number")]
    pub clarity: i64,
    #[serde(deserialize_with = "whole_number")]
    pub tone: i64,
    #[serde(deserialize_with = "whole_number")]
    pub engagement: i64,
    #[serde(deserialize_with = "whole_number")]
    pub relevance: i64,
    pub suggestion: String,
}

/// Accept `8` and `8.0`, reject `8.5`
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(D::Error::custom(format!(
            "expected a whole-number score, got {}",
            value
        )));
    }
    Ok(value as i64)
}

impl CriticOutput {
    /// Arithmetic mean of the four sub-scores
    pub fn mean_score(&self) -> f64 {
        (self.clarity + self.tone + self.engagement + self.relevance) as f64 / 4.0
    }
}

impl StructuredOutput for CriticOutput {
    const SHAPE: &'static str = "critic";

    fn validate(&self) -> Result<(), DecodeError> {
        let fields = [
            ("clarity", self.clarity),
            ("tone", self.tone),
            ("engagement", self.engagement),
            ("relevance", self.relevance),
        ];
        for (field, value) in fields {
            if !(1..=10).contains(&value) {
                return Err(DecodeError::OutOfRange {
                    field,
                    value,
                    min: 1,
                    max: 10,
                });
            }
        }
        Ok(())
    }
}

impl StructuredOutput for UrlAnalysis {
    const SHAPE: &'static str = "url analysis";
}

impl StructuredOutput for ImageAnalysis {
    const SHAPE: &'static str = "image analysis";
}

impl StructuredOutput for VideoAnalysis {
    const SHAPE: &'static str = "video analysis";
}

/// Strip markdown code fences around (or embedded in) a model response.
///
/// A response that *is* a fenced block loses its outer fences, even when the
/// block itself contains fences. A fenced block buried in prose is extracted.
/// Text without fences is returned trimmed.
pub fn strip_markdown_fences(text: &str) -> &str {
    let s = text.trim();
    if s.len() >= 6 && s.starts_with("```") && s.ends_with("```") {
        let inner = &s[3..s.len() - 3];
        let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        return inner.trim();
    }

    if let Some(body) = FENCED_BLOCK.captures(s).and_then(|caps| caps.get(1)) {
        return body.as_str().trim();
    }

    // Unterminated fence: drop the opening marker only
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    s.trim()
}

/// Decode a model response into `T`, validating its constraints.
///
/// Well-formed JSON is taken as-is, so fences inside string values survive.
/// Otherwise the fence-stripped body is tried, then the outermost `{...}` of
/// the body and of the raw text.
pub fn decode<T: StructuredOutput>(raw: &str) -> Result<T, DecodeError> {
    let trimmed = raw.trim();
    let body = strip_markdown_fences(trimmed);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<T>(trimmed) {
        return validated(value);
    }

    let source = match serde_json::from_str::<T>(body) {
        Ok(value) => return validated(value),
        Err(err) => err,
    };

    for slice in [outer_object(body), outer_object(trimmed)].into_iter().flatten() {
        if let Ok(value) = serde_json::from_str::<T>(slice) {
            return validated(value);
        }
    }

    Err(DecodeError::Syntax {
        shape: T::SHAPE,
        source,
    })
}

fn validated<T: StructuredOutput>(value: T) -> Result<T, DecodeError> {
    value.validate()?;
    Ok(value)
}

/// Decode a model response, substituting a fallback on failure.
///
/// The failure is logged with `site` so a regression in one prompt is
/// visible without interrupting the run.
pub fn decode_or_else<T, F>(raw: &str, site: &str, fallback: F) -> T
where
    T: StructuredOutput,
    F: FnOnce(&DecodeError) -> T,
{
    match decode::<T>(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("Failed to decode {} output ({}); using fallback", site, err);
            fallback(&err)
        }
    }
}

/// Slice from the first `{` to the last `}`, if both exist in order
fn outer_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let end = s.rfind('}')?;
    (end > start).then(|| &s[start..=end])
}
