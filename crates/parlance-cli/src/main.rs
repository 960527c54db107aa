#![deny(unsafe_code)]

//! Parlance CLI — run the resolver server or talk to a running one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parlance_config::AppConfig;
use parlance_core::http::server::{self, AppState, ShutdownSignal};
use parlance_core::http::ApiClient;
use parlance_core::{Catalog, Resolver};

/// Parlance — a natural-language to function-call resolution server.
#[derive(Parser)]
#[command(name = "parlance", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "parlance.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the resolution server.
    Serve,

    /// Resolve a single query locally and print the call descriptor.
    Resolve {
        /// The natural-language question.
        query: String,
    },

    /// Show status of a running server.
    Status {
        /// Server base URL (default derived from config).
        #[arg(long)]
        url: Option<String>,
    },

    /// Stop a running server.
    Stop {
        /// Server base URL (default derived from config).
        #[arg(long)]
        url: Option<String>,
    },

    /// Validate and display configuration.
    Config {
        /// Show the resolved configuration.
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing subscriber with verbosity level
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Serve => cmd_serve(&cli.config).await?,
        Commands::Resolve { query } => cmd_resolve(&cli.config, &query).await?,
        Commands::Status { url } => cmd_status(&cli.config, url).await?,
        Commands::Stop { url } => cmd_stop(&cli.config, url).await?,
        Commands::Config { show } => cmd_config(&cli.config, show).await?,
    }

    Ok(())
}

async fn cmd_serve(config_path: &Path) -> Result<()> {
    let config = load_config(config_path).await?;
    let catalog = Catalog::from_config(&config.catalog)?;
    info!(
        functions = catalog.registry().len(),
        rules = catalog.rules().len(),
        "catalog loaded"
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let addr = server::listen_addr(&config)?;
    let state = Arc::new(AppState {
        config,
        resolver: Resolver::new(catalog),
        shutdown_tx: shutdown_tx.clone(),
        started_at: Instant::now(),
    });

    // Ctrl-C triggers the same graceful shutdown as POST /stop
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("ctrl-c received, initiating graceful shutdown");
            let _ = shutdown_tx.send(ShutdownSignal);
        }
    });

    server::serve(addr, state, shutdown_rx).await?;
    Ok(())
}

async fn cmd_resolve(config_path: &Path, query: &str) -> Result<()> {
    let config = load_config(config_path).await?;
    let catalog = Catalog::from_config(&config.catalog)?;
    let resolver = Resolver::new(catalog);

    let descriptor = resolver.resolve(query)?;
    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}

async fn cmd_status(config_path: &Path, url: Option<String>) -> Result<()> {
    let client = client_for(config_path, url).await?;
    let status = client.status().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

async fn cmd_stop(config_path: &Path, url: Option<String>) -> Result<()> {
    let client = client_for(config_path, url).await?;
    let stop = client.stop().await?;
    println!("{}", stop.message);
    Ok(())
}

async fn cmd_config(config_path: &Path, show: bool) -> Result<()> {
    let config = load_config(config_path).await?;
    // Surface catalog defects here too, so `config` is a full preflight
    let catalog = Catalog::from_config(&config.catalog)?;
    if show {
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| anyhow::anyhow!("TOML error: {e}"))?;
        println!("{toml_str}");
    } else {
        println!(
            "Configuration at '{}' is valid ({} functions, {} rules).",
            config_path.display(),
            catalog.registry().len(),
            catalog.rules().len()
        );
    }
    Ok(())
}

async fn client_for(config_path: &Path, url: Option<String>) -> Result<ApiClient> {
    let base_url = match url {
        Some(url) => url,
        None => server_base_url(&load_config(config_path).await?),
    };
    Ok(ApiClient::new(base_url))
}

fn server_base_url(config: &AppConfig) -> String {
    format!(
        "http://{}:{}",
        config.server.listen_addr, config.server.listen_port
    )
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::load(path).await.map_err(|e| anyhow::anyhow!(e))
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}
