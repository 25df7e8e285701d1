// ABOUTME: Inference backend abstraction for streaming text generation
// ABOUTME: Defines the provider contract, stream types, and the fallback model registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! # Inference Provider Interface
//!
//! This module defines the contract between the HTTP layer and the upstream
//! inference backend. The gateway never talks to Ollama directly; it goes
//! through [`InferenceProvider`], which keeps the relay testable against a
//! scripted backend.
//!
//! ## Key Concepts
//!
//! - **[`GenerationRequest`]**: a (system prompt, user prompt, model) triple
//! - **[`GenerationChunk`]**: one incremental text fragment from the backend
//! - **[`GenerationStream`]**: the lazy, cancellable fragment sequence
//! - **[`ModelRegistry`]**: model listing that degrades to a configured
//!   fallback instead of failing

mod ollama;
mod stream;

pub use ollama::{OllamaConfig, OllamaProvider};
pub use stream::{create_line_stream, LineBuffer};

use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::warn;

use crate::errors::AppError;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A single token-generation request
///
/// System and user prompts travel as distinct fields all the way to the
/// backend; they are never concatenated into one string.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instruction text, may be empty
    pub system_prompt: String,
    /// User prompt text
    pub user_prompt: String,
    /// Backend model identifier
    pub model: String,
}

impl GenerationRequest {
    /// Create a new generation request
    #[must_use]
    pub fn new(
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: model.into(),
        }
    }
}

/// One incremental piece of generated text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationChunk {
    /// Text fragment for this chunk (may be empty on the final chunk)
    pub text: String,
    /// Whether the backend signalled normal completion with this chunk
    pub done: bool,
}

impl GenerationChunk {
    /// A text fragment mid-stream
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }

    /// The completion marker
    #[must_use]
    pub fn done() -> Self {
        Self {
            text: String::new(),
            done: true,
        }
    }
}

/// Stream type for incremental generation output
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk, AppError>> + Send>>;

// ============================================================================
// Provider Trait
// ============================================================================

/// Inference backend contract
///
/// Implemented by [`OllamaProvider`] in production and by scripted mocks in
/// tests. All methods surface backend failures as [`AppError`]; callers own
/// the retry/fallback decision.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Unique provider identifier (e.g. "ollama")
    fn name(&self) -> &'static str;

    /// Open a streaming generation call
    ///
    /// Fragments arrive in backend emission order. The stream ends after
    /// a `done` chunk or an error item; dropping it aborts the upstream
    /// call.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request or cannot be
    /// reached.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationStream, AppError>;

    /// List the model identifiers the backend currently serves
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or responds with
    /// a malformed payload.
    async fn list_models(&self) -> Result<Vec<String>, AppError>;

    /// Check whether the backend is reachable
    ///
    /// # Errors
    ///
    /// Returns an error if the reachability probe itself fails to execute.
    async fn health_check(&self) -> Result<bool, AppError>;
}

// ============================================================================
// Model Registry
// ============================================================================

/// Model listing with availability-over-correctness semantics
///
/// Wraps a provider's `list_models` so the caller always receives at least
/// one usable model identifier: on backend failure, an empty list, or a
/// malformed payload, the configured fallback list is substituted. Model
/// selection must never block the rest of the system from functioning.
pub struct ModelRegistry {
    provider: Arc<dyn InferenceProvider>,
    fallback: Vec<String>,
}

impl ModelRegistry {
    /// Create a registry over a provider with a fallback list
    ///
    /// The fallback list must be non-empty; configuration guarantees this.
    #[must_use]
    pub fn new(provider: Arc<dyn InferenceProvider>, fallback: Vec<String>) -> Self {
        Self { provider, fallback }
    }

    /// List available models, never failing
    pub async fn list(&self) -> Vec<String> {
        match self.provider.list_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                warn!(
                    "{} reported no models, using fallback list",
                    self.provider.name()
                );
                self.fallback.clone()
            }
            Err(e) => {
                warn!("Failed to list models from {}: {e}", self.provider.name());
                self.fallback.clone()
            }
        }
    }
}
