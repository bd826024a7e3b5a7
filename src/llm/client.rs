use reqwest::{Client, StatusCode};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::types::{ChatMessage, ChatRequest, ChatResponse};
use super::{CompletionClient, TransportFailure};
use crate::config::LlmConfig;
use crate::{preview, TARGET_LLM_REQUEST};

/// OpenAI-compatible chat-completion client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    http: Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, TransportFailure> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .gzip(true)
            .build()
            .map_err(|e| TransportFailure::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn build_request(&self, prompt: &str, max_tokens: u32, temperature: f32) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens,
        }
    }
}

impl CompletionClient for HttpLlmClient {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, TransportFailure> {
        let body = self.build_request(prompt, max_tokens, temperature);
        let started = Instant::now();

        debug!(target: TARGET_LLM_REQUEST, "POST {} model={} max_tokens={} prompt={}", self.config.endpoint, self.config.model, max_tokens, preview(prompt, 200));

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!(target: TARGET_LLM_REQUEST, "LLM request timed out after {:?}", started.elapsed());
                    TransportFailure::Timeout(self.config.request_timeout)
                } else {
                    error!(target: TARGET_LLM_REQUEST, "LLM request failed: {}", e);
                    TransportFailure::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!(target: TARGET_LLM_REQUEST, "Failed to read LLM response body: {}", e);
            if e.is_timeout() {
                TransportFailure::Timeout(self.config.request_timeout)
            } else {
                TransportFailure::Network(e.to_string())
            }
        })?;

        // Only 200 carries a completion; other 2xx codes are surfaced too.
        if status != StatusCode::OK {
            error!(target: TARGET_LLM_REQUEST, "LLM API error (HTTP {}): {}", status, preview(&text, 500));
            return Err(TransportFailure::Status {
                status_code: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(target: TARGET_LLM_REQUEST, "Unparseable LLM response: {}. Body: {}", e, preview(&text, 500));
                return Err(TransportFailure::MalformedResponse {
                    detail: e.to_string(),
                    body: text,
                });
            }
        };

        match parsed.first_content() {
            Some(content) => {
                info!(target: TARGET_LLM_REQUEST, "LLM response received in {:.2?} ({} chars)", started.elapsed(), content.chars().count());
                debug!(target: TARGET_LLM_REQUEST, "LLM response: {}", content);
                Ok(content)
            }
            None => {
                error!(target: TARGET_LLM_REQUEST, "LLM response has no choices[0].message.content: {}", preview(&text, 500));
                Err(TransportFailure::MalformedResponse {
                    detail: "missing choices[0].message.content".to_string(),
                    body: text,
                })
            }
        }
    }
}
