// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Database Management
//!
//! SQLite-backed durable storage for the prompt store. The [`Database`]
//! handle owns the connection pool and runs the schema migration on startup.

mod prompts;

pub use prompts::{PromptManager, PromptRecord};

use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

/// Database handle for prompt storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options =
            if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
                ensure_parent_dir(database_url)?;
                format!("{database_url}?mode=rwc")
            } else {
                database_url.to_owned()
            };

        let pool = SqlitePool::connect(&connection_options)
            .await
            .with_context(|| format!("Failed to open database at {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        // Prompt records are append-only: fork adds a new row pointing at its
        // parent, nothing is ever updated or deleted.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS prompts (
                id TEXT PRIMARY KEY,
                system_prompt TEXT NOT NULL,
                user_prompt TEXT NOT NULL,
                model TEXT NOT NULL,
                response TEXT NOT NULL DEFAULT '',
                parent_id TEXT REFERENCES prompts(id),
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_prompts_created_at ON prompts(created_at DESC)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_prompts_parent_id ON prompts(parent_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Create the parent directory of a `sqlite:` file URL if needed
fn ensure_parent_dir(database_url: &str) -> Result<()> {
    let path = database_url.trim_start_matches("sqlite:");
    if path.is_empty() || path.starts_with(':') {
        // In-memory databases have no backing file
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }
    }

    Ok(())
}
