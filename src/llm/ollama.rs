// ABOUTME: Ollama inference provider speaking the native /api/generate NDJSON protocol
// ABOUTME: Streams generation output and lists installed models via /api/tags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! # Ollama Provider
//!
//! [`InferenceProvider`] implementation for a local Ollama instance.
//!
//! ## Wire format
//!
//! - `POST /api/generate` with `{model, prompt, system, stream: true}`
//!   returns newline-delimited JSON objects carrying a `response` text
//!   fragment, a terminal `done: true` marker, or an in-band `error`.
//! - `GET /api/tags` returns `{"models": [{"name": ...}, ...]}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::{
    create_line_stream, GenerationChunk, GenerationRequest, GenerationStream, InferenceProvider,
};
use crate::errors::AppError;

/// Default base URL for a local Ollama instance
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Connection timeout when opening upstream calls
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Request timeout for the lightweight model-list and health probes.
/// Generation calls carry no overall deadline; the relay enforces its own
/// inactivity window instead.
const PROBE_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// API Request/Response Types (Ollama native format)
// ============================================================================

/// Generate request payload
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    stream: bool,
}

/// One NDJSON line of a streaming generate response
#[derive(Debug, Deserialize)]
struct OllamaGenerateLine {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Model tags response
#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

/// One installed model entry
#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// Error body returned by Ollama on non-2xx responses
#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama instance (e.g. <http://localhost:11434>)
    pub base_url: String,
}

impl OllamaConfig {
    /// Create a configuration for the given base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Ollama inference provider
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OllamaConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Map a request error to an `AppError` with a useful connect hint
    fn request_error(&self, e: &reqwest::Error) -> AppError {
        if e.is_connect() || e.is_timeout() {
            AppError::external_unavailable(
                "Ollama",
                format!(
                    "Cannot connect to Ollama. Is the server running at {}?",
                    self.config.base_url
                ),
            )
        } else {
            AppError::external_service("Ollama", format!("Request failed: {e}"))
        }
    }

    /// Parse a non-2xx response body into an `AppError`
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OllamaErrorResponse>(body) {
            match status.as_u16() {
                502..=504 => AppError::external_unavailable("Ollama", error_response.error),
                _ => AppError::external_service("Ollama", error_response.error),
            }
        } else {
            AppError::external_service(
                "Ollama",
                format!(
                    "API error ({}): {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            )
        }
    }

    /// Parse one NDJSON line of a streaming generate response
    fn parse_generate_line(line: &str) -> Option<Result<GenerationChunk, AppError>> {
        match serde_json::from_str::<OllamaGenerateLine>(line) {
            Ok(payload) => {
                if let Some(message) = payload.error {
                    return Some(Err(AppError::external_service("Ollama", message)));
                }

                let text = payload.response.unwrap_or_default();
                if payload.done {
                    Some(Ok(GenerationChunk { text, done: true }))
                } else if text.is_empty() {
                    None
                } else {
                    Some(Ok(GenerationChunk::text(text)))
                }
            }
            Err(e) => {
                warn!("Failed to parse generate stream line: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationStream, AppError> {
        debug!(
            model = %request.model,
            system_len = request.system_prompt.len(),
            prompt_len = request.user_prompt.len(),
            "Opening generation stream"
        );

        let payload = OllamaGenerateRequest {
            model: &request.model,
            prompt: &request.user_prompt,
            system: &request.system_prompt,
            stream: true,
        };

        let response = self
            .client
            .post(self.api_url("api/generate"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to open generation stream: {e}");
                self.request_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error_response(status, &body));
        }

        Ok(create_line_stream(
            response.bytes_stream(),
            Self::parse_generate_line,
            "Ollama",
        ))
    }

    async fn list_models(&self) -> Result<Vec<String>, AppError> {
        let response = self
            .client
            .get(self.api_url("api/tags"))
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error_response(status, &body));
        }

        let tags: OllamaTagsResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("Ollama", format!("Malformed tags response: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .client
            .get(self.api_url("api/tags"))
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| self.request_error(&e))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_line_text_fragment() {
        let chunk = OllamaProvider::parse_generate_line(r#"{"response":"Hel","done":false}"#)
            .unwrap()
            .unwrap();
        assert_eq!(chunk.text, "Hel");
        assert!(!chunk.done);
    }

    #[test]
    fn test_parse_generate_line_done_marker() {
        let chunk = OllamaProvider::parse_generate_line(r#"{"done":true,"total_duration":12}"#)
            .unwrap()
            .unwrap();
        assert!(chunk.done);
        assert!(chunk.text.is_empty());
    }

    #[test]
    fn test_parse_generate_line_in_band_error() {
        let result =
            OllamaProvider::parse_generate_line(r#"{"error":"model 'x' not found"}"#).unwrap();
        let error = result.unwrap_err();
        assert!(error.to_string().contains("model 'x' not found"));
    }

    #[test]
    fn test_parse_generate_line_skips_empty_and_malformed() {
        assert!(OllamaProvider::parse_generate_line(r#"{"response":"","done":false}"#).is_none());
        assert!(OllamaProvider::parse_generate_line("not json").is_none());
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let provider =
            OllamaProvider::new(OllamaConfig::new("http://localhost:11434/")).unwrap();
        assert_eq!(
            provider.api_url("api/tags"),
            "http://localhost:11434/api/tags"
        );
    }
}
