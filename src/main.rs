//! Vanta MCP - Model Context Protocol server for the Vanta API
//!
//! Exposes Vanta's compliance tests, controls, frameworks, people, groups
//! and documents as MCP tools over stdio.

mod api;
mod auth;
mod config;
mod error;
mod mcp;
mod models;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::client::VantaClient;
use auth::{ClientCredentialsSource, CredentialLoader, SystemClock, TokenManager};
use config::{RuntimeConfig, Settings};
use mcp::{McpServer, ToolRegistry};

#[derive(Parser)]
#[command(name = "vanta-mcp")]
#[command(about = "MCP server for the Vanta compliance API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file holding client_id and client_secret
    #[arg(long, env = "VANTA_ENV_FILE", global = true)]
    env_file: Option<PathBuf>,

    /// API region: us, eu or aus
    #[arg(long, env = "REGION", global = true)]
    region: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "VANTA_API_BASE_URL", global = true, hide = true)]
    base_url: Option<String>,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, env = "VANTA_REQUEST_TIMEOUT_SECS", global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (default)
    Serve,

    /// Check credentials and show which API the server would talk to
    Status,
}

impl Cli {
    fn overrides(&self) -> Settings {
        Settings {
            env_file: self.env_file.clone(),
            region: self.region.clone(),
            base_url: self.base_url.clone(),
            request_timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs go to stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Settings::load()?.merge(cli.overrides()).resolve()?;
    tracing::debug!("Using {} API at {}", config.region, config.base_url);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await?,
        Commands::Status => status(config).await?,
    }

    Ok(())
}

fn build_client(config: &RuntimeConfig) -> Result<Arc<VantaClient>> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let clock = Arc::new(SystemClock);
    let source = ClientCredentialsSource::new(
        http.clone(),
        &config.base_url,
        CredentialLoader::new(config.credentials_path.clone()),
        clock.clone(),
    );
    let tokens = Arc::new(TokenManager::new(Arc::new(source), clock));

    Ok(Arc::new(VantaClient::new(http, config.base_url.clone(), tokens)))
}

async fn serve(config: RuntimeConfig) -> Result<()> {
    let client = build_client(&config)?;

    client
        .tokens()
        .initialize_token()
        .await
        .context("Failed to initialize Vanta API token")?;
    tracing::info!("Token initialized successfully");

    let mut registry = ToolRegistry::new();
    api::register_tools(&mut registry, &client);
    tracing::info!("Serving {} tools over stdio", registry.len());

    mcp::serve_stdio(Arc::new(McpServer::new(registry))).await
}

async fn status(config: RuntimeConfig) -> Result<()> {
    println!("Region:      {}", config.region);
    println!("Base URL:    {}", config.base_url);
    println!("Token URL:   {}", config.endpoint(auth::TOKEN_PATH));

    let client = build_client(&config)?;
    client
        .tokens()
        .initialize_token()
        .await
        .context("Failed to obtain Vanta API token")?;

    match client.tokens().snapshot() {
        Some(token) => {
            let expires_at = i64::try_from(token.expires_at)
                .ok()
                .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| token.expires_at.to_string());
            println!("Token:       valid");
            println!("  expires_at: {}", expires_at);
        }
        None => println!("Token:       none"),
    }

    Ok(())
}
