// ABOUTME: Model listing route handler backed by the fallback-aware registry
// ABOUTME: Always answers with a non-empty model list, even when the backend is down
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Model listing route

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::resources::ServerResources;

/// Response listing available model identifiers
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    /// Available model identifiers, never empty
    pub models: Vec<String>,
}

/// Model listing route handler
pub struct ModelRoutes;

impl ModelRoutes {
    /// Create the model routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/models", get(Self::list_models))
            .with_state(resources)
    }

    /// List available models, substituting the fallback list on backend failure
    async fn list_models(State(resources): State<Arc<ServerResources>>) -> Json<ModelsResponse> {
        Json(ModelsResponse {
            models: resources.registry.list().await,
        })
    }
}
