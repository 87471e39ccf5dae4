// Post generation pipeline
//
// Drives one request through content analysis, research, drafting and
// critique, looping Writer → Critic until the draft scores well enough or the
// rewrite budget runs out. Every collaborator failure degrades to a documented
// fallback so a run always returns a complete `PipelineState`.

pub mod collaborators;
pub mod controller;
pub mod critic;
pub mod dispatcher;
pub mod parser;
pub mod research;
pub mod types;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use collaborators::{
    Collaborators, ContentAnalyzer, CritiqueRequest, Critic, Researcher, Writer, WriterBrief,
};
pub use controller::{mermaid, next_after_critique, PipelineStage, RewriteController};
pub use dispatcher::ContentAnalysisDispatcher;
pub use parser::{decode, decode_or_else, strip_markdown_fences, DecodeError, StructuredOutput};
pub use types::{
    AnalysisResult, ContentKind, GenerationRequest, ImageAnalysis, PipelineConfig,
    PipelineState, Round, StopReason, UrlAnalysis, VideoAnalysis,
};
