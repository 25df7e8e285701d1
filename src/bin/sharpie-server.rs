// ABOUTME: Server binary wiring configuration, storage, and the inference provider
// ABOUTME: Starts the Sharpie HTTP/SSE gateway
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Sharpie Server Binary
//!
//! Starts the prompt playground backend: SQLite prompt store, Ollama
//! streaming relay, and the HTTP/SSE gateway.

use anyhow::Result;
use clap::Parser;
use sharpie::{
    config::ServerConfig,
    database::Database,
    llm::{OllamaConfig, OllamaProvider},
    logging,
    resources::ServerResources,
    server::HttpServer,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "sharpie-server")]
#[command(about = "Sharpie - self-hostable AI prompt playground")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Sharpie API");
    info!("{}", config.summary());

    // Initialize the prompt store (creates the schema on first run)
    let database = Database::new(&config.database_url).await?;
    info!("Database initialized: {}", config.database_url);

    // Initialize the inference provider
    let provider = OllamaProvider::new(OllamaConfig::new(config.ollama_base_url.clone()))?;
    info!("Inference provider ready: {}", config.ollama_base_url);

    let http_port = config.http_port;
    let resources = Arc::new(ServerResources::new(
        database,
        Arc::new(provider),
        Arc::new(config),
    ));

    HttpServer::new(resources).run(http_port).await
}
