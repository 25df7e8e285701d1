// ABOUTME: Integration tests for the model listing and health endpoints
// ABOUTME: Verifies fallback behavior when the inference backend is unreachable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_test_resources, MockProvider};
use helpers::axum_test::AxumTestRequest;
use sharpie::routes::{models::ModelsResponse, HealthRoutes, ModelRoutes};

use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// Model Listing
// ============================================================================

#[tokio::test]
async fn test_list_models_returns_backend_models() {
    let provider = Arc::new(MockProvider::with_models(vec![
        "llama3.1:8b".to_owned(),
        "mistral:7b".to_owned(),
    ]));
    let (resources, _dir) = create_test_resources(provider).await;
    let router = ModelRoutes::routes(resources);

    let response = AxumTestRequest::get("/api/models").send(router).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let models: ModelsResponse = response.json();
    assert_eq!(
        models.models,
        vec!["llama3.1:8b".to_owned(), "mistral:7b".to_owned()]
    );
}

#[tokio::test]
async fn test_list_models_falls_back_when_backend_unreachable() {
    let provider = Arc::new(MockProvider::unreachable());
    let (resources, _dir) = create_test_resources(provider).await;
    let router = ModelRoutes::routes(resources);

    let response = AxumTestRequest::get("/api/models").send(router).await;

    // Never hard-fails: the configured fallback list is substituted
    assert_eq!(response.status_code(), StatusCode::OK);
    let models: ModelsResponse = response.json();
    assert_eq!(models.models, vec!["qwen2.5:3b".to_owned()]);
}

#[tokio::test]
async fn test_list_models_falls_back_when_backend_reports_none() {
    let provider = Arc::new(MockProvider::with_models(Vec::new()));
    let (resources, _dir) = create_test_resources(provider).await;
    let router = ModelRoutes::routes(resources);

    let models: ModelsResponse = AxumTestRequest::get("/api/models")
        .send(router)
        .await
        .json();
    assert_eq!(models.models, vec!["qwen2.5:3b".to_owned()]);
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_service_info_endpoint() {
    let provider = Arc::new(MockProvider::with_script(Vec::new()));
    let (resources, _dir) = create_test_resources(provider).await;
    let router = HealthRoutes::routes(resources);

    let response = AxumTestRequest::get("/").send(router).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let info: Value = response.json();
    assert_eq!(info["service"], "Sharpie API");
    assert_eq!(info["status"], "running");
}

#[tokio::test]
async fn test_health_reports_connected_backend() {
    let provider = Arc::new(MockProvider::with_script(Vec::new()));
    let (resources, _dir) = create_test_resources(provider).await;
    let router = HealthRoutes::routes(resources);

    let response = AxumTestRequest::get("/health").send(router).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let health: Value = response.json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["ollama"], "connected");
}

#[tokio::test]
async fn test_health_degrades_without_failing_when_backend_down() {
    let provider = Arc::new(MockProvider::unreachable());
    let (resources, _dir) = create_test_resources(provider).await;
    let router = HealthRoutes::routes(resources);

    let response = AxumTestRequest::get("/health").send(router).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let health: Value = response.json();
    assert_eq!(health["status"], "degraded");
    assert_eq!(health["ollama"], "disconnected");
}
