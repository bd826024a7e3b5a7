//! One news item in, one validated analysis out.

mod orchestrator;
mod state;

use std::fmt;
use uuid::Uuid;

use crate::extract::ExtractionFailure;
use crate::llm::TransportFailure;
use crate::news::NewsInput;
use crate::schema::{AnalysisResult, PathIssue, ValidationFailure};

pub use self::orchestrator::{Generation, Orchestrator};
pub use self::state::{PipelineState, Stage, Trail};

/// Result of the optional follow-up call. Its absence never fails a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryAdvice {
    Provided(String),
    Absent { reason: String },
}

impl SummaryAdvice {
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryAdvice::Provided(text) => Some(text),
            SummaryAdvice::Absent { .. } => None,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub run_id: Uuid,
    pub news: NewsInput,
    pub analysis: AnalysisResult,
    /// Non-fatal schema findings, e.g. lists that defaulted to empty.
    pub warnings: Vec<PathIssue>,
    /// Which extraction strategy located the JSON.
    pub extraction_strategy: &'static str,
    pub summary: SummaryAdvice,
    pub trail: Vec<PipelineState>,
}

#[derive(Debug)]
pub enum PipelineError {
    /// The news text was empty or whitespace; no call was made.
    EmptyInput,
    Cancelled {
        stage: Stage,
    },
    Transport {
        stage: Stage,
        failure: TransportFailure,
    },
    Extraction(ExtractionFailure),
    Validation(ValidationFailure),
}

impl PipelineError {
    /// The stage that failed, or `None` if the run never left `Idle`.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::EmptyInput => None,
            PipelineError::Cancelled { stage } | PipelineError::Transport { stage, .. } => {
                Some(*stage)
            }
            PipelineError::Extraction(_) => Some(Stage::Extracting),
            PipelineError::Validation(_) => Some(Stage::Validating),
        }
    }

    /// The upstream text that caused the failure, for diagnostics.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            PipelineError::EmptyInput | PipelineError::Cancelled { .. } => None,
            PipelineError::Transport { failure, .. } => failure.raw_body(),
            PipelineError::Extraction(failure) => Some(&failure.raw_text),
            PipelineError::Validation(failure) => Some(failure.raw_candidate()),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::EmptyInput => write!(f, "news text is empty"),
            PipelineError::Cancelled { stage } => write!(f, "cancelled while {}", stage),
            PipelineError::Transport { stage, failure } => write!(f, "{} failed: {}", stage, failure),
            PipelineError::Extraction(failure) => write!(f, "extracting failed: {}", failure),
            PipelineError::Validation(failure) => write!(f, "validating failed: {}", failure),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Transport { failure, .. } => Some(failure),
            PipelineError::Extraction(failure) => Some(failure),
            PipelineError::Validation(failure) => Some(failure),
            PipelineError::EmptyInput | PipelineError::Cancelled { .. } => None,
        }
    }
}
