// ABOUTME: Main library entry point for the Sharpie prompt playground server
// ABOUTME: Exposes the streaming relay, prompt store, model registry, and HTTP gateway
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Sharpie

#![deny(unsafe_code)]

//! # Sharpie
//!
//! Self-hostable AI prompt playground: compose a system prompt and a user
//! prompt, stream a model's response token by token, and share or fork the
//! resulting snapshot via an opaque record id.
//!
//! ## Architecture
//!
//! - **`llm`**: inference provider abstraction (Ollama in production) and
//!   the fallback-aware model registry
//! - **`database`**: append-only prompt snapshot store on SQLite
//! - **`routes`**: HTTP/SSE gateway mapping the above onto REST endpoints
//! - **`errors`**: unified error codes with HTTP status mapping
//! - **`config`** / **`logging`**: environment-driven runtime configuration
//!
//! The relay and the store never talk to each other: clients orchestrate
//! "generate, then share" as two sequential calls, and every stored record
//! is immutable once created.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sharpie::config::ServerConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env()?;
//! println!("Sharpie configured: {}", config.summary());
//! # Ok(())
//! # }
//! ```

/// Environment-driven server configuration
pub mod config;

/// SQLite-backed prompt snapshot store
pub mod database;

/// Unified error handling with HTTP status mapping
pub mod errors;

/// Inference provider abstraction and model registry
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Shared server resources (router state)
pub mod resources;

/// HTTP/SSE gateway routes
pub mod routes;

/// HTTP server bootstrap
pub mod server;
