// ABOUTME: Shared server resources passed to every route handler as axum state
// ABOUTME: Bundles the database, the inference provider, the model registry, and config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Shared server resources

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::{InferenceProvider, ModelRegistry};

/// Long-lived resources shared across all request handlers
pub struct ServerResources {
    /// Prompt store database handle
    pub database: Database,
    /// Upstream inference provider
    pub provider: Arc<dyn InferenceProvider>,
    /// Model listing with fallback semantics
    pub registry: ModelRegistry,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Bundle resources for the router
    #[must_use]
    pub fn new(
        database: Database,
        provider: Arc<dyn InferenceProvider>,
        config: Arc<ServerConfig>,
    ) -> Self {
        let registry = ModelRegistry::new(Arc::clone(&provider), config.fallback_models.clone());
        Self {
            database,
            provider,
            registry,
            config,
        }
    }
}
