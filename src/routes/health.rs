// ABOUTME: Service info and health check endpoints for operational visibility
// ABOUTME: Reports upstream backend reachability without ever hard-failing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Health check endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::resources::ServerResources;

/// Overall health status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All components reachable
    Healthy,
    /// The service works but the inference backend is unreachable
    Degraded,
}

/// Service info response
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    /// Service name
    pub service: String,
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: HealthStatus,
    /// Inference backend connectivity ("connected" / "disconnected")
    pub ollama: String,
    /// Error detail when the backend probe failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health route handlers
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create the health routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::service_info))
            .route("/health", get(Self::health_check))
            .with_state(resources)
    }

    /// Service identity and version
    async fn service_info() -> Json<ServiceInfoResponse> {
        Json(ServiceInfoResponse {
            service: "Sharpie API".to_owned(),
            status: "running".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        })
    }

    /// Probe the inference backend and report connectivity
    ///
    /// Always answers 200: an unreachable backend degrades the service but
    /// does not take it down (the prompt store keeps working).
    async fn health_check(State(resources): State<Arc<ServerResources>>) -> Json<HealthResponse> {
        let response = match resources.provider.health_check().await {
            Ok(true) => HealthResponse {
                status: HealthStatus::Healthy,
                ollama: "connected".to_owned(),
                error: None,
            },
            Ok(false) => HealthResponse {
                status: HealthStatus::Degraded,
                ollama: "disconnected".to_owned(),
                error: None,
            },
            Err(e) => HealthResponse {
                status: HealthStatus::Degraded,
                ollama: "disconnected".to_owned(),
                error: Some(e.to_string()),
            },
        };

        Json(response)
    }
}
