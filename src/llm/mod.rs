//! Chat-completion transport.
//!
//! [`CompletionClient`] is the seam the pipeline depends on; [`HttpLlmClient`]
//! is the production implementation. Tests substitute scripted clients.

mod client;
mod types;

use std::fmt;
use std::future::Future;
use std::time::Duration;

pub use self::client::HttpLlmClient;
pub use self::types::*;

/// Sends one prompt and returns the completion text.
///
/// Implementations must be stateless across calls apart from configuration,
/// so the same client can serve any number of sequential or concurrent
/// pipeline runs.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> impl Future<Output = Result<String, TransportFailure>> + Send;
}

/// Anything that prevented a completion from coming back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The endpoint answered with a non-2xx status.
    Status { status_code: u16, body: String },
    /// The request never completed (DNS, TLS, connection reset, ...).
    Network(String),
    Timeout(Duration),
    /// A 2xx response without `choices[0].message.content`.
    MalformedResponse { detail: String, body: String },
}

impl TransportFailure {
    /// The upstream payload worth showing when surfacing this failure.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            TransportFailure::Status { body, .. }
            | TransportFailure::MalformedResponse { body, .. } => Some(body),
            TransportFailure::Network(_) | TransportFailure::Timeout(_) => None,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Status { status_code, body } => {
                write!(f, "LLM API error (HTTP {}): {}", status_code, body)
            }
            TransportFailure::Network(detail) => write!(f, "LLM request failed: {}", detail),
            TransportFailure::Timeout(after) => write!(f, "LLM request timed out after {:?}", after),
            TransportFailure::MalformedResponse { detail, .. } => {
                write!(f, "LLM response malformed: {}", detail)
            }
        }
    }
}

impl std::error::Error for TransportFailure {}
