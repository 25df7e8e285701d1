// ABOUTME: Database operations for the append-only prompt snapshot store
// ABOUTME: Handles save, fetch-by-id, and fork-with-parent-link creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

// ============================================================================
// Database Record Types
// ============================================================================

/// One immutable stored prompt+response snapshot
///
/// Records form a forest: a record created by fork points at its parent via
/// `parent_id`, root records have none. Records are never updated or deleted
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    /// Opaque unique identifier, assigned at creation
    pub id: String,
    /// System prompt text, may be empty
    pub system_prompt: String,
    /// User prompt text
    pub user_prompt: String,
    /// Inference model identifier the snapshot was taken with
    pub model: String,
    /// Generated response text, may be empty
    pub response: String,
    /// Parent record id when created via fork, `None` for root records
    pub parent_id: Option<String>,
    /// When the record was created (ISO 8601)
    pub created_at: String,
}

// ============================================================================
// Prompt Manager
// ============================================================================

/// Prompt store operations
pub struct PromptManager {
    pool: SqlitePool,
}

impl PromptManager {
    /// Create a new prompt manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Save a new root snapshot
    ///
    /// Always creates a fresh record with a generated id and no parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn save(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        response: &str,
    ) -> AppResult<PromptRecord> {
        self.insert(system_prompt, user_prompt, model, response, None)
            .await
    }

    /// Get a snapshot by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, id: &str) -> AppResult<Option<PromptRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, system_prompt, user_prompt, model, response, parent_id, created_at
            FROM prompts
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get prompt: {e}")))?;

        Ok(row.map(|r| PromptRecord {
            id: r.get("id"),
            system_prompt: r.get("system_prompt"),
            user_prompt: r.get("user_prompt"),
            model: r.get("model"),
            response: r.get("response"),
            parent_id: r.get("parent_id"),
            created_at: r.get("created_at"),
        }))
    }

    /// Fork an existing snapshot
    ///
    /// Creates a new record pointing at `parent_id`, with an empty response:
    /// a fork starts a new, not-yet-generated branch and never copies the
    /// parent's response. Returns `None` (and creates nothing) if the parent
    /// does not exist. Acyclic by construction: a fork always points at a
    /// record that already exists, and records are never deleted, so a
    /// parent observed here stays valid forever.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn fork(
        &self,
        parent_id: &str,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
    ) -> AppResult<Option<PromptRecord>> {
        if self.get(parent_id).await?.is_none() {
            return Ok(None);
        }

        let record = self
            .insert(system_prompt, user_prompt, model, "", Some(parent_id))
            .await?;

        Ok(Some(record))
    }

    /// Count stored snapshots
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn count(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM prompts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count prompts: {e}")))?;

        Ok(row.get("count"))
    }

    /// Insert a new record with a fresh id and timestamp
    async fn insert(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        response: &str,
        parent_id: Option<&str>,
    ) -> AppResult<PromptRecord> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO prompts (id, system_prompt, user_prompt, model, response, parent_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(system_prompt)
        .bind(user_prompt)
        .bind(model)
        .bind(response)
        .bind(parent_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to save prompt: {e}")))?;

        Ok(PromptRecord {
            id,
            system_prompt: system_prompt.to_owned(),
            user_prompt: user_prompt.to_owned(),
            model: model.to_owned(),
            response: response.to_owned(),
            parent_id: parent_id.map(ToOwned::to_owned),
            created_at: now,
        })
    }
}
