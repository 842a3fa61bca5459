//! Command-line runner for destination actions.
//!
//! Resolves a raw event file into an action payload and either prints the
//! vendor request body or sends it.

use std::path::PathBuf;

use actions_core::config::AppConfig;
use actions_core::HttpRequestClient;
use anyhow::Context;
use clap::{Parser, Subcommand};
use destination_actions::algolia_insights::{self, AlgoliaSettings};
use destination_actions::iterable::API_KEY_HEADER;
use destination_actions::mapping::track_purchase_payload;
use destination_actions::track_purchase;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "destinations-cli")]
#[command(about = "Run destination actions against raw platform events")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables still override it)
    #[arg(long, env = "DESTINATIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long, env = "DESTINATIONS__HTTP__TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send an "Order Completed" event to Iterable's trackPurchase endpoint
    TrackPurchase {
        /// Path to the raw event JSON
        #[arg(long)]
        event: PathBuf,

        /// Print the request body instead of sending it
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the ACL of the configured Algolia API key
    AlgoliaPermissions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "destinations_cli=info,destination_actions=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(timeout_ms) = cli.timeout_ms {
        config.http.timeout_ms = timeout_ms;
    }

    info!(timeout_ms = config.http.timeout_ms, "Configuration loaded");

    match cli.command {
        Command::TrackPurchase { event, dry_run } => {
            let raw = std::fs::read_to_string(&event)
                .with_context(|| format!("reading {}", event.display()))?;
            let event: serde_json::Value =
                serde_json::from_str(&raw).context("event file is not valid JSON")?;
            let payload = track_purchase_payload(&event)?;

            if dry_run {
                let request = track_purchase::build_request(&payload, chrono::Utc::now())?;
                println!("{}", serde_json::to_string_pretty(&request)?);
                return Ok(());
            }

            if config.iterable.api_key.is_empty() {
                anyhow::bail!("DESTINATIONS__ITERABLE__API_KEY is not set");
            }
            let client = HttpRequestClient::new(&config.http)?
                .with_default_header(API_KEY_HEADER, config.iterable.api_key.clone());
            let response = track_purchase::perform(&client, &payload).await?;
            info!(status = response.status, "purchase tracked");
            println!("{}", serde_json::to_string_pretty(&response.body)?);
        }
        Command::AlgoliaPermissions => {
            let settings = AlgoliaSettings {
                app_id: config.algolia.app_id.clone(),
                api_key: config.algolia.api_key.clone(),
            };
            if settings.app_id.is_empty() || settings.api_key.is_empty() {
                anyhow::bail!("Algolia app_id and api_key must both be configured");
            }
            let client = HttpRequestClient::new(&config.http)?;
            let permissions = algolia_insights::fetch_permissions(&client, &settings).await?;
            if !permissions.can_send_events() {
                warn!("API key lacks the search ACL required for Insights events");
            }
            println!("{}", serde_json::to_string_pretty(&permissions)?);
        }
    }

    Ok(())
}
