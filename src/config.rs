// ABOUTME: Environment-driven server configuration for deployment-specific settings
// ABOUTME: Parses ports, storage location, upstream backend address, and streaming tunables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

//! Environment-based configuration management
//!
//! All runtime configuration comes from environment variables with sensible
//! development defaults, so `sharpie-server` starts with no flags against a
//! local Ollama instance.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Environment variable for the HTTP listen port
const HTTP_PORT_ENV: &str = "HTTP_PORT";

/// Environment variable for the SQLite database URL
const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable for the Ollama base URL
const OLLAMA_BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

/// Legacy alias for the Ollama base URL, kept for docker-compose setups
const OLLAMA_HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable for the comma-separated fallback model list
const FALLBACK_MODELS_ENV: &str = "FALLBACK_MODELS";

/// Environment variable for the streaming inactivity timeout (seconds)
const STREAM_IDLE_TIMEOUT_ENV: &str = "STREAM_IDLE_TIMEOUT_SECS";

/// Environment variable for allowed CORS origins (comma-separated, `*` for any)
const ALLOWED_ORIGINS_ENV: &str = "ALLOWED_ORIGINS";

/// Default HTTP listen port
const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default SQLite database URL
const DEFAULT_DATABASE_URL: &str = "sqlite:data/sharpie.db";

/// Default Ollama base URL
const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model served when the backend reports none
const DEFAULT_FALLBACK_MODEL: &str = "qwen2.5:3b";

/// Default inactivity window for generation streams
const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 120;

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite connection URL for the prompt store
    pub database_url: String,
    /// Base URL of the upstream Ollama instance
    pub ollama_base_url: String,
    /// Models returned when the backend is unreachable or reports none.
    /// Always non-empty; the first entry is the default generation model.
    pub fallback_models: Vec<String>,
    /// A generation stream that produces no output for this many seconds
    /// is treated as a broken upstream connection
    pub stream_idle_timeout_secs: u64,
    /// Allowed CORS origins (`["*"]` means any origin)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse (e.g. a
    /// non-numeric `HTTP_PORT`).
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(HTTP_PORT_ENV) {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("{HTTP_PORT_ENV} must be a valid port: {value}"))?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let database_url =
            env::var(DATABASE_URL_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned());

        let ollama_base_url = env::var(OLLAMA_BASE_URL_ENV)
            .or_else(|_| env::var(OLLAMA_HOST_ENV))
            .unwrap_or_else(|_| DEFAULT_OLLAMA_BASE_URL.to_owned());

        let fallback_models = env::var(FALLBACK_MODELS_ENV)
            .map(|value| parse_list(&value))
            .ok()
            .filter(|models| !models.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_FALLBACK_MODEL.to_owned()]);

        let stream_idle_timeout_secs = match env::var(STREAM_IDLE_TIMEOUT_ENV) {
            Ok(value) => value.parse::<u64>().with_context(|| {
                format!("{STREAM_IDLE_TIMEOUT_ENV} must be a number of seconds: {value}")
            })?,
            Err(_) => DEFAULT_STREAM_IDLE_TIMEOUT_SECS,
        };

        let allowed_origins = env::var(ALLOWED_ORIGINS_ENV)
            .map(|value| parse_list(&value))
            .ok()
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_owned()]);

        Ok(Self {
            http_port,
            database_url,
            ollama_base_url,
            fallback_models,
            stream_idle_timeout_secs,
            allowed_origins,
        })
    }

    /// The model used when a generation request names none
    #[must_use]
    pub fn default_model(&self) -> &str {
        self.fallback_models
            .first()
            .map_or(DEFAULT_FALLBACK_MODEL, String::as_str)
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} database={} ollama={} fallback_models=[{}] stream_idle_timeout={}s",
            self.http_port,
            self.database_url,
            self.ollama_base_url,
            self.fallback_models.join(", "),
            self.stream_idle_timeout_secs
        )
    }
}

/// Split a comma-separated environment value into trimmed non-empty entries
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_trims_and_drops_empty() {
        assert_eq!(
            parse_list("qwen2.5:3b, llama3.1:8b ,,"),
            vec!["qwen2.5:3b".to_owned(), "llama3.1:8b".to_owned()]
        );
        assert!(parse_list("  ,").is_empty());
    }

    #[test]
    fn test_default_model_falls_back_when_list_empty() {
        let config = ServerConfig {
            http_port: DEFAULT_HTTP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_owned(),
            fallback_models: Vec::new(),
            stream_idle_timeout_secs: DEFAULT_STREAM_IDLE_TIMEOUT_SECS,
            allowed_origins: vec!["*".to_owned()],
        };
        assert_eq!(config.default_model(), DEFAULT_FALLBACK_MODEL);
    }
}
