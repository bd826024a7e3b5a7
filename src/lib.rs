pub mod chart;
pub mod config;
pub mod environment;
pub mod extract;
pub mod llm;
pub mod logging;
pub mod news;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod schema;
pub mod scoring;

pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_PIPELINE: &str = "pipeline";
pub const TARGET_SCHEMA: &str = "schema";

pub use config::{LlmConfig, PipelineOptions, ValidationMode};
pub use llm::{CompletionClient, HttpLlmClient, TransportFailure};
pub use news::NewsInput;
pub use pipeline::{AnalysisOutcome, Orchestrator, PipelineError, PipelineState, SummaryAdvice};
pub use schema::{AnalysisResult, SchemaTemplate, ValidationFailure};

/// Returns at most `max_chars` characters of `text`, for log lines that
/// quote upstream payloads.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
