//! Isolates the JSON payload from a free-text model reply.
//!
//! Models do not reliably answer with bare JSON: replies arrive wrapped in
//! prose, in fenced code blocks, or both. Strategies are tried in order and
//! the first non-empty match wins. Nothing here repairs the JSON itself.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::{preview, TARGET_PIPELINE};

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```[ \t]*json[ \t]*\r?\n?(.*?)```").expect("fenced block pattern is valid")
});

/// One way of locating a JSON candidate inside text.
pub trait JsonExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the candidate slice, or `None` when this strategy finds nothing.
    fn find<'a>(&self, text: &'a str) -> Option<&'a str>;
}

/// Takes the interior of the first fenced block tagged `json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FencedBlock;

impl JsonExtractor for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced-block"
    }

    fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        let interior = FENCED_JSON.captures(text)?.get(1)?.as_str().trim();
        (!interior.is_empty()).then_some(interior)
    }
}

/// Takes everything from the first `{` to the last `}`, inclusive.
#[derive(Debug, Default, Clone, Copy)]
pub struct BraceSpan;

impl JsonExtractor for BraceSpan {
    fn name(&self) -> &'static str {
        "brace-span"
    }

    fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        (end > start).then(|| &text[start..=end])
    }
}

/// A located candidate and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub candidate: String,
    pub strategy: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub reason: &'static str,
    pub raw_text: String,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in reply of {} bytes", self.reason, self.raw_text.len())
    }
}

impl std::error::Error for ExtractionFailure {}

/// An ordered chain of extraction strategies.
pub struct ResponseExtractor {
    strategies: Vec<Box<dyn JsonExtractor>>,
}

impl Default for ResponseExtractor {
    fn default() -> Self {
        Self::new(vec![Box::new(FencedBlock), Box::new(BraceSpan)])
    }
}

impl ResponseExtractor {
    pub fn new(strategies: Vec<Box<dyn JsonExtractor>>) -> Self {
        Self { strategies }
    }

    pub fn extract(&self, raw_text: &str) -> Result<Extraction, ExtractionFailure> {
        for strategy in &self.strategies {
            if let Some(candidate) = strategy.find(raw_text) {
                debug!(
                    target: TARGET_PIPELINE,
                    "Extracted {} byte candidate via {}",
                    candidate.len(),
                    strategy.name()
                );
                return Ok(Extraction {
                    candidate: candidate.to_string(),
                    strategy: strategy.name(),
                });
            }
        }

        debug!(target: TARGET_PIPELINE, "No JSON found in reply: {}", preview(raw_text, 200));
        Err(ExtractionFailure {
            reason: "no-json-found",
            raw_text: raw_text.to_string(),
        })
    }
}

/// Runs the default strategy chain.
pub fn extract(raw_text: &str) -> Result<Extraction, ExtractionFailure> {
    ResponseExtractor::default().extract(raw_text)
}
