// ABOUTME: HTTP route composition for the Sharpie gateway
// ABOUTME: Merges per-domain routers and applies CORS and request tracing layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! HTTP/SSE gateway routes
//!
//! One module per domain, each exposing a `routes()` constructor in the
//! same shape; [`router`] merges them and applies the shared middleware.

pub mod generate;
pub mod health;
pub mod models;
pub mod prompts;

pub use generate::GenerateRoutes;
pub use health::HealthRoutes;
pub use models::ModelRoutes;
pub use prompts::PromptRoutes;

use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::resources::ServerResources;

/// Build the full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    let cors = cors_layer(&resources.config.allowed_origins);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(ModelRoutes::routes(Arc::clone(&resources)))
        .merge(GenerateRoutes::routes(Arc::clone(&resources)))
        .merge(PromptRoutes::routes(resources))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer from the configured origin list
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().map_or_else(
                |_| {
                    warn!("Ignoring unparseable CORS origin: {origin}");
                    None
                },
                Some,
            )
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
