// ABOUTME: Prompt store route handlers for saving, fetching, and forking snapshots
// ABOUTME: Provides REST endpoints over the append-only prompt version graph
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Prompt store routes
//!
//! Snapshots are immutable: saving and forking always create new records,
//! fetching never mutates. Share links are capability URLs built from the
//! returned record id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{
    database::{PromptManager, PromptRecord},
    errors::AppError,
    resources::ServerResources,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to save a new prompt snapshot
#[derive(Debug, Deserialize)]
pub struct SavePromptRequest {
    /// System prompt text
    #[serde(default)]
    pub system_prompt: String,
    /// User prompt text
    pub user_prompt: String,
    /// Model identifier the snapshot was taken with
    pub model: String,
    /// Response text; omitted when sharing before generation completes
    #[serde(default)]
    pub response: Option<String>,
}

/// Request to fork an existing snapshot
///
/// The parent is addressed by the URL path; a `parent_id` in the body is
/// accepted for client convenience but must match the path when present.
#[derive(Debug, Deserialize)]
pub struct ForkPromptRequest {
    /// Parent record id (optional, must equal the path id if set)
    #[serde(default)]
    pub parent_id: Option<String>,
    /// System prompt text for the new branch
    #[serde(default)]
    pub system_prompt: String,
    /// User prompt text for the new branch
    pub user_prompt: String,
    /// Model identifier for the new branch
    pub model: String,
}

/// A stored prompt snapshot as returned to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    /// Record id, usable as a share link capability
    pub id: String,
    /// System prompt text
    pub system_prompt: String,
    /// User prompt text
    pub user_prompt: String,
    /// Model identifier
    pub model: String,
    /// Response text, empty if not yet generated
    pub response: String,
    /// Parent record id, null for root records
    pub parent_id: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

impl From<PromptRecord> for PromptResponse {
    fn from(record: PromptRecord) -> Self {
        Self {
            id: record.id,
            system_prompt: record.system_prompt,
            user_prompt: record.user_prompt,
            model: record.model,
            response: record.response,
            parent_id: record.parent_id,
            created_at: record.created_at,
        }
    }
}

// ============================================================================
// Prompt Routes
// ============================================================================

/// Prompt store route handlers
pub struct PromptRoutes;

impl PromptRoutes {
    /// Create the prompt store routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/prompts", post(Self::save_prompt))
            .route("/api/prompts/:prompt_id", get(Self::get_prompt))
            .route("/api/prompts/:prompt_id/fork", post(Self::fork_prompt))
            .with_state(resources)
    }

    /// Create a `PromptManager` over the shared pool
    fn manager(resources: &ServerResources) -> PromptManager {
        PromptManager::new(resources.database.pool().clone())
    }

    /// Save a prompt snapshot and return the shareable record
    async fn save_prompt(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<SavePromptRequest>,
    ) -> Result<(StatusCode, Json<PromptResponse>), AppError> {
        let record = Self::manager(&resources)
            .save(
                &request.system_prompt,
                &request.user_prompt,
                &request.model,
                request.response.as_deref().unwrap_or(""),
            )
            .await?;

        info!(prompt_id = %record.id, "Prompt saved");
        Ok((StatusCode::CREATED, Json(record.into())))
    }

    /// Fetch a saved snapshot by id
    async fn get_prompt(
        State(resources): State<Arc<ServerResources>>,
        Path(prompt_id): Path<String>,
    ) -> Result<Json<PromptResponse>, AppError> {
        let record = Self::manager(&resources)
            .get(&prompt_id)
            .await?
            .ok_or_else(|| AppError::not_found("Prompt"))?;

        Ok(Json(record.into()))
    }

    /// Fork an existing snapshot into a new branch
    async fn fork_prompt(
        State(resources): State<Arc<ServerResources>>,
        Path(prompt_id): Path<String>,
        Json(request): Json<ForkPromptRequest>,
    ) -> Result<(StatusCode, Json<PromptResponse>), AppError> {
        if let Some(body_parent) = &request.parent_id {
            if body_parent != &prompt_id {
                return Err(AppError::invalid_input(
                    "parent_id in body does not match the prompt id in the path",
                ));
            }
        }

        let record = Self::manager(&resources)
            .fork(
                &prompt_id,
                &request.system_prompt,
                &request.user_prompt,
                &request.model,
            )
            .await?
            .ok_or_else(|| AppError::not_found("Parent prompt"))?;

        info!(prompt_id = %record.id, parent_id = %prompt_id, "Prompt forked");
        Ok((StatusCode::CREATED, Json(record.into())))
    }
}
