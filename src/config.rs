//! Runtime configuration for the LLM endpoint and the analysis pipeline.

use anyhow::{Context, Result};
use std::fmt;
use std::time::Duration;

use crate::environment::{get_env_flag, get_env_var, get_env_var_or, get_first_env_var};

pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_ANALYSIS_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Connection and generation settings for the chat-completion endpoint.
#[derive(Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub analysis_max_tokens: u32,
    pub summary_max_tokens: u32,
    pub request_timeout: Duration,
}

impl LlmConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            analysis_max_tokens: DEFAULT_ANALYSIS_MAX_TOKENS,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, analysis: u32, summary: u32) -> Self {
        self.analysis_max_tokens = analysis;
        self.summary_max_tokens = summary;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Loads the configuration from environment variables.
    ///
    /// `LLM_API_KEY` (or `DEEPSEEK_API_KEY`) is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let api_key = get_first_env_var(&["LLM_API_KEY", "DEEPSEEK_API_KEY"])
            .context("LLM_API_KEY (or DEEPSEEK_API_KEY) environment variable required")?;
        let endpoint = get_env_var("LLM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        reqwest::Url::parse(&endpoint)
            .with_context(|| format!("LLM_ENDPOINT is not a valid URL: {}", endpoint))?;

        let config = Self::new(endpoint, api_key)
            .with_model(get_env_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()))
            .with_temperature(get_env_var_or("LLM_TEMPERATURE", DEFAULT_TEMPERATURE))
            .with_max_tokens(
                get_env_var_or("LLM_MAX_TOKENS", DEFAULT_ANALYSIS_MAX_TOKENS),
                get_env_var_or("LLM_SUMMARY_MAX_TOKENS", DEFAULT_SUMMARY_MAX_TOKENS),
            )
            .with_request_timeout(Duration::from_secs(get_env_var_or(
                "LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )));

        Ok(config)
    }
}

// The API key must never reach a log line.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("analysis_max_tokens", &self.analysis_max_tokens)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// How strictly a model reply is checked against the schema template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Missing lists default to empty and are reported as warnings.
    #[default]
    Lenient,
    /// Missing lists are schema errors, like missing scalars.
    Strict,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub validation: ValidationMode,
    /// Upper bound on each individual LLM call.
    pub call_timeout: Duration,
    /// Attempts for the primary call; transport failures only.
    pub primary_attempts: u32,
    pub retry_backoff: Duration,
    /// Whether to issue the follow-up summary call at all.
    pub summarize: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Lenient,
            call_timeout: DEFAULT_TIMEOUT,
            primary_attempts: 1,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            summarize: true,
        }
    }
}

impl PipelineOptions {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            validation: if get_env_flag("ANALYSIS_STRICT", false) {
                ValidationMode::Strict
            } else {
                ValidationMode::Lenient
            },
            call_timeout: Duration::from_secs(get_env_var_or(
                "LLM_TIMEOUT_SECS",
                defaults.call_timeout.as_secs(),
            )),
            primary_attempts: get_env_var_or("ANALYSIS_ATTEMPTS", defaults.primary_attempts).max(1),
            retry_backoff: defaults.retry_backoff,
            summarize: get_env_flag("ANALYSIS_SUMMARY", defaults.summarize),
        }
    }
}
