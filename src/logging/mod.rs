// Run logging
//
// Records every finished pipeline run to JSONL so drafts and scores can be
// reviewed after the fact.

pub mod run_logger;

pub use run_logger::{RunLogger, RunRecord};
