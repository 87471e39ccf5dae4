// Project-wide constants
//
// Centralised here so defaults have one source of truth.
// Import via `use crate::config::constants::*;`.

/// Writer → Critic rounds allowed before the loop is forced to stop.
pub const DEFAULT_REWRITE_BUDGET: u32 = 3;

/// Mean critic score at or above which a draft is accepted.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 7.0;

/// Upper bound on any single collaborator call.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Target post length when a request omits `word_limit`.
pub const DEFAULT_WORD_LIMIT: u32 = 250;

/// Default maximum tokens for provider completions.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Hosted URL summary extractor.
///
/// Overridden by `RENDER_API_BASE_URL` or `[url_summarizer] base_url`.
pub const DEFAULT_URL_SUMMARIZER_URL: &str = "https://linkedin-url-summary-extractor.onrender.com";

/// The summarizer is slow to cold start but should answer within this.
pub const DEFAULT_SUMMARIZER_TIMEOUT_SECS: u64 = 10;

/// Tavily-compatible web search API used by research when a key is set.
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://api.tavily.com";

/// Search results handed to the research summarizer.
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 5;

pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

/// Config directory under the user's home (`~/.quill`).
pub const CONFIG_DIR: &str = ".quill";

pub const CONFIG_FILE: &str = "config.toml";
