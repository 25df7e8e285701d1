// ABOUTME: Shared fixtures for integration tests
// ABOUTME: Builds file-backed test resources and a scripted mock inference provider

#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use sharpie::{
    config::ServerConfig,
    database::Database,
    errors::AppError,
    llm::{GenerationChunk, GenerationRequest, GenerationStream, InferenceProvider},
    resources::ServerResources,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// One scripted event emitted by the mock backend
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Emit a text fragment
    Text(&'static str),
    /// Emit the completion marker
    Done,
    /// Emit a mid-stream error
    Error(&'static str),
    /// Stop emitting but keep the stream open (simulates a hung backend)
    Stall,
}

/// Scripted inference backend for relay tests
pub struct MockProvider {
    script: Vec<MockEvent>,
    fail_open: Option<String>,
    models: Option<Vec<String>>,
    healthy: bool,
    /// Number of generation calls issued to this provider
    pub generate_calls: AtomicUsize,
    /// The most recent generation request, for argument assertions
    pub last_request: Mutex<Option<GenerationRequest>>,
}

impl MockProvider {
    /// A backend that plays the given script on every generation call
    pub fn with_script(script: Vec<MockEvent>) -> Self {
        Self {
            script,
            fail_open: None,
            models: Some(vec!["qwen2.5:3b".to_owned()]),
            healthy: true,
            generate_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A backend whose generation call fails to open
    pub fn failing_open(message: &str) -> Self {
        let mut provider = Self::with_script(Vec::new());
        provider.fail_open = Some(message.to_owned());
        provider
    }

    /// A backend reporting the given model list
    pub fn with_models(models: Vec<String>) -> Self {
        let mut provider = Self::with_script(Vec::new());
        provider.models = Some(models);
        provider
    }

    /// A backend that cannot be reached at all
    pub fn unreachable() -> Self {
        let mut provider = Self::with_script(Vec::new());
        provider.models = None;
        provider.healthy = false;
        provider
    }

    /// Number of generation calls observed so far
    pub fn calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationStream, AppError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(message) = &self.fail_open {
            return Err(AppError::external_unavailable("mock", message.clone()));
        }

        let mut items: Vec<Result<GenerationChunk, AppError>> = Vec::new();
        let mut stall = false;
        for event in &self.script {
            match event {
                MockEvent::Text(text) => items.push(Ok(GenerationChunk::text(*text))),
                MockEvent::Done => items.push(Ok(GenerationChunk::done())),
                MockEvent::Error(message) => {
                    items.push(Err(AppError::external_service("mock", *message)));
                }
                MockEvent::Stall => {
                    stall = true;
                    break;
                }
            }
        }

        if stall {
            Ok(Box::pin(
                stream::iter(items).chain(stream::pending::<Result<GenerationChunk, AppError>>()),
            ))
        } else {
            Ok(Box::pin(stream::iter(items)))
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, AppError> {
        self.models
            .clone()
            .ok_or_else(|| AppError::external_unavailable("mock", "backend down"))
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(self.healthy)
    }
}

/// Test configuration with a short streaming inactivity window
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        ollama_base_url: "http://localhost:11434".to_owned(),
        fallback_models: vec!["qwen2.5:3b".to_owned()],
        stream_idle_timeout_secs: 2,
        allowed_origins: vec!["*".to_owned()],
    }
}

/// Build server resources over a fresh file-backed database
///
/// Returns the `TempDir` alongside the resources so the database file
/// outlives the test.
pub async fn create_test_resources(
    provider: Arc<dyn InferenceProvider>,
) -> (Arc<ServerResources>, TempDir) {
    create_test_resources_with_config(provider, test_config()).await
}

/// Build server resources with a custom configuration
pub async fn create_test_resources_with_config(
    provider: Arc<dyn InferenceProvider>,
    config: ServerConfig,
) -> (Arc<ServerResources>, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}/sharpie-test.db", dir.path().display());
    let database = Database::new(&url).await.expect("Failed to open test db");

    let resources = Arc::new(ServerResources::new(database, provider, Arc::new(config)));
    (resources, dir)
}
