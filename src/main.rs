use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use session_scribe::completion::AnthropicClient;
use session_scribe::config::Config;
use session_scribe::server::{self, AppState};
use session_scribe::summary::SummaryService;

/// HTTP service that turns therapy session notes into a summary and care plan
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file (defaults to ~/.session-scribe/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Write the effective config (without the API key) and exit
    #[arg(long)]
    write_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };

    let mut config = Config::load_or_default(&config_path);
    config.apply_env(|name| std::env::var(name).ok());
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if args.write_config {
        config.save(&config_path)?;
        println!("Config written to {}", config_path.display());
        return Ok(());
    }

    info!("Session scribe starting...");
    info!("Model: {}", config.model);
    info!("API: {}", config.api_base_url);

    let api_key = config.require_api_key()?;
    let completion = AnthropicClient::new(
        &config.api_base_url,
        api_key,
        config.connect_timeout(),
        config.request_timeout(),
    )
    .context("Failed to create completion client")?;

    let service = Arc::new(SummaryService::new(
        Arc::new(completion),
        config.generation_settings(),
    ));
    let app = server::build_router(AppState { service }, config.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;

    server::serve(addr, app).await
}
