// ABOUTME: HTTP server bootstrap that binds the listener and serves the router
// ABOUTME: Logs the available endpoints on startup for operator visibility
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! HTTP server entry point

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::resources::ServerResources;
use crate::routes;

/// HTTP server wrapping the gateway router
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    /// Create a server over the shared resources
    #[must_use]
    pub fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Bind the listener and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails.
    pub async fn run(self, port: u16) -> Result<()> {
        let app = routes::router(self.resources);

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
            .await
            .with_context(|| format!("Failed to bind port {port}"))?;

        display_available_endpoints(port);
        info!("Sharpie API listening on port {port}");

        axum::serve(listener, app)
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}

/// Display the available API endpoints on startup
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());

    info!("=== Available API Endpoints ===");
    info!("   Service Info:   GET  http://{host}:{port}/");
    info!("   Health Check:   GET  http://{host}:{port}/health");
    info!("   List Models:    GET  http://{host}:{port}/api/models");
    info!("   Generate (SSE): POST http://{host}:{port}/api/generate");
    info!("   Save Prompt:    POST http://{host}:{port}/api/prompts");
    info!("   Get Prompt:     GET  http://{host}:{port}/api/prompts/{{id}}");
    info!("   Fork Prompt:    POST http://{host}:{port}/api/prompts/{{id}}/fork");
    info!("=== End of Endpoint List ===");
}
