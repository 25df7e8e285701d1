// ABOUTME: Streaming generation relay route handler
// ABOUTME: Validates the prompt, proxies the backend stream, and frames output as SSE events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Generation relay route
//!
//! `POST /api/generate` opens a single streaming call to the inference
//! backend and re-emits its incremental output as SSE frames:
//!
//! - `data: {"text": ...}` for each fragment, in backend emission order
//! - exactly one terminal frame, `data: {"done": true}` on completion or
//!   `data: {"error": ...}` on backend failure, broken connection, or
//!   inactivity timeout
//!
//! Validation failures are rejected with an HTTP status before the upstream
//! call is opened; once the stream starts, errors are in-band frames because
//! the response headers are already committed. The relay holds no buffer
//! beyond one frame: the next upstream read happens only after the transport
//! accepts the previous frame, so a slow client backpressures the backend
//! read. Client disconnect drops the stream, which aborts the upstream call.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures_util::stream::Stream;
use serde::Deserialize;
use serde_json::json;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use crate::{errors::AppError, llm::GenerationRequest, resources::ServerResources};

/// Maximum accepted length for each prompt field, in characters
const MAX_PROMPT_CHARS: usize = 5000;

// ============================================================================
// Request Types
// ============================================================================

/// Request to start a generation stream
#[derive(Debug, Deserialize)]
pub struct GenerateRequestBody {
    /// System prompt (optional, may be empty)
    #[serde(default)]
    pub system_prompt: String,
    /// User prompt (required, must be non-empty after trimming)
    pub user_prompt: String,
    /// Model identifier; defaults to the configured default model
    #[serde(default)]
    pub model: Option<String>,
}

// ============================================================================
// Generate Routes
// ============================================================================

/// Generation relay route handler
pub struct GenerateRoutes;

impl GenerateRoutes {
    /// Create the generation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/generate", post(Self::generate))
            .with_state(resources)
    }

    /// Validate a generation request before any upstream call is made
    fn validate(request: &GenerateRequestBody) -> Result<(), AppError> {
        if request.user_prompt.trim().is_empty() {
            return Err(AppError::missing_field("user_prompt"));
        }
        if request.user_prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(AppError::invalid_input(format!(
                "user_prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        if request.system_prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(AppError::invalid_input(format!(
                "system_prompt exceeds {MAX_PROMPT_CHARS} characters"
            )));
        }
        Ok(())
    }

    /// Stream a generated response as SSE frames
    async fn generate(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<GenerateRequestBody>,
    ) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
        Self::validate(&request)?;

        let model = request
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| resources.config.default_model().to_owned());

        let generation =
            GenerationRequest::new(request.system_prompt, request.user_prompt, model);
        let provider = Arc::clone(&resources.provider);
        let idle_timeout = Duration::from_secs(resources.config.stream_idle_timeout_secs);

        let stream = async_stream::stream! {
            // The upstream call is opened inside the stream so that open
            // failures surface as in-band error frames: by the time this
            // body runs, the 200 response headers are already on the wire.
            let mut upstream = match provider.generate(&generation).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to open generation stream: {e}");
                    yield Ok(error_frame(&e.to_string()));
                    return;
                }
            };

            debug!(model = %generation.model, "Generation stream opened");

            loop {
                match tokio::time::timeout(idle_timeout, upstream.next()).await {
                    Ok(Some(Ok(chunk))) => {
                        if !chunk.text.is_empty() {
                            yield Ok(Event::default().data(json!({ "text": chunk.text }).to_string()));
                        }
                        if chunk.done {
                            yield Ok(Event::default().data(json!({ "done": true }).to_string()));
                            return;
                        }
                    }
                    Ok(Some(Err(e))) => {
                        warn!("Generation stream failed: {e}");
                        yield Ok(error_frame(&e.to_string()));
                        return;
                    }
                    Ok(None) => {
                        // Upstream closed without a done marker
                        warn!("Generation stream ended before completion");
                        yield Ok(error_frame(
                            "Generation failed: backend stream ended before completion",
                        ));
                        return;
                    }
                    Err(_) => {
                        warn!(
                            "Generation stream idle for {}s, giving up",
                            idle_timeout.as_secs()
                        );
                        yield Ok(error_frame(&format!(
                            "Generation failed: no output from backend within {}s",
                            idle_timeout.as_secs()
                        )));
                        return;
                    }
                }
            }
        };

        Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
    }
}

/// Build the in-band error terminal frame
fn error_frame(message: &str) -> Event {
    Event::default().data(json!({ "error": message }).to_string())
}
