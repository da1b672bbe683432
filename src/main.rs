//! Social Rewards Validation Service
//!
//! Keeps the growth campaign's rewardable content cached and classifies
//! social events (tweet shares, follows) as rewardable or not.
//!
//! Features:
//! - Scheduled catalog refresh from the growth GraphQL service
//! - Newline-delimited JSON event input, one verdict per line
//! - Content fingerprints for reward claim correlation
//! - Graceful shutdown with SIGTERM handling
//! - Correlation IDs for distributed tracing
//! - Prometheus metrics

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use social_rewards::catalog::{spawn_refresh_loop, CampaignSource, GraphQlCampaignSource};
use social_rewards::config::Config;
use social_rewards::events::read_envelopes;
use social_rewards::http_client::{HttpClientConfig, ResilientHttpClient};
use social_rewards::{fingerprint, CatalogStore, EventEnvelope, RefreshOutcome, ShareValidator, SocialEvent};

/// Social Rewards - validation of rewardable social shares
#[derive(Parser, Debug)]
#[command(name = "social-rewards")]
#[command(author = "NEURO Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validates social shares against the active growth campaign")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, default_value = "false", global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep the catalog refreshed and validate NDJSON events from stdin
    Run,

    /// Fetch the active campaign once and print the catalog
    Refresh {
        /// Output format (json, summary)
        #[arg(short, long, default_value = "summary")]
        output: String,
    },

    /// Validate every event envelope in a file (one JSON object per line)
    Validate {
        /// Path to the NDJSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the fingerprint of a text
    Hash {
        /// Canonical text to fingerprint
        text: String,
    },
}

/// Generates a new correlation ID for the session
fn generate_correlation_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sets up structured logging with tracing. Logs go to stderr so stdout
/// carries verdicts only.
fn setup_logging(log_level: &str, json_output: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Handles graceful shutdown on SIGTERM/SIGINT
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    let _ = shutdown_tx.send(());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs);

    let correlation_id = generate_correlation_id();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        correlation_id = %correlation_id,
        "Starting social rewards validator"
    );

    if let Commands::Hash { text } = &cli.command {
        println!("{}", fingerprint(text));
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    info!(
        growth_server = ?config.growth_server_url,
        validation_mode = %config.validation_mode,
        refresh_interval_secs = config.catalog_refresh_interval_secs,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Run => run_service(config).await?,
        Commands::Refresh { output } => refresh_once(config, &output).await?,
        Commands::Validate { file } => validate_file(config, &file).await?,
        Commands::Hash { .. } => {}
    }

    Ok(())
}

fn build_campaign_source(config: &Config) -> Result<Arc<dyn CampaignSource>> {
    let client = ResilientHttpClient::new(HttpClientConfig::from_config(config))?;
    Ok(Arc::new(GraphQlCampaignSource::new(
        client,
        config.growth_server_url.clone(),
    )))
}

/// Runs the long-lived service: scheduled refresh, metrics, stdin events
async fn run_service(config: Config) -> Result<()> {
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let store = Arc::new(CatalogStore::new());
    let source = build_campaign_source(&config)?;
    let validator = ShareValidator::new(store.clone(), config.validation_mode()?);

    store.refresh(source.as_ref()).await;
    let refresh_handle = spawn_refresh_loop(
        store.clone(),
        source.clone(),
        config.refresh_interval(),
        shutdown_tx.subscribe(),
    );

    if config.metrics_enabled {
        let metrics_addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.metrics_port).parse()?;
        tokio::spawn(async move {
            if let Err(e) = social_rewards::metrics::start_metrics_server(metrics_addr).await {
                error!(error = %e, "Metrics server failed");
            }
        });
        info!(port = config.metrics_port, "Metrics server started at /metrics");
    }

    tokio::spawn(shutdown_signal(shutdown_tx.clone()));
    let mut shutdown_rx = shutdown_tx.subscribe();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    info!("Reading events from stdin");
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => {
                        info!("Event input closed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let envelope: EventEnvelope = match serde_json::from_str(&line) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(error = %e, "Skipping malformed event envelope");
                        continue;
                    }
                };

                if let Some(output) = validate_envelope(&validator, envelope)? {
                    stdout.write_all(output.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
            }
        }
    }

    let _ = shutdown_tx.send(());
    let _ = refresh_handle.await;

    info!("Social rewards validator stopped");
    Ok(())
}

/// Validates one envelope and renders the verdict as a JSON line.
/// Unsupported or malformed events are logged and produce no output.
fn validate_envelope(validator: &ShareValidator, envelope: EventEnvelope) -> Result<Option<String>> {
    match SocialEvent::from_envelope(envelope) {
        Ok(event) => {
            let verdict = validator.validate(&event);
            Ok(Some(serde_json::to_string(&verdict)?))
        }
        Err(e) => {
            warn!(error = %e, "Event not validated");
            Ok(None)
        }
    }
}

/// Fetches the active campaign once and prints the catalog
async fn refresh_once(config: Config, output_format: &str) -> Result<()> {
    let store = CatalogStore::new();
    let source = build_campaign_source(&config)?;

    if let RefreshOutcome::Failed = store.refresh(source.as_ref()).await {
        anyhow::bail!("catalog refresh failed, see logs");
    }

    let catalog = store.get();
    match output_format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(catalog.as_ref())?);
        }
        _ => {
            println!("\nActive Campaign");
            println!("===============");
            println!("Campaign: {}", catalog.campaign_id.as_deref().unwrap_or("-"));
            println!("Status:   {}", catalog.campaign_status.as_deref().unwrap_or("-"));
            println!(
                "Window:   {} .. {}",
                catalog.start_date.as_deref().unwrap_or("-"),
                catalog.end_date.as_deref().unwrap_or("-")
            );
            println!("Items:    {}", catalog.len());
            for item in catalog.items() {
                println!(
                    "  - {} ({} translations) [{}]",
                    item.link,
                    item.translations.len(),
                    fingerprint(item.default_text.trim())
                );
            }
        }
    }

    Ok(())
}

/// Refreshes the catalog, then validates every envelope in `path`
async fn validate_file(config: Config, path: &std::path::Path) -> Result<()> {
    let store = Arc::new(CatalogStore::new());
    let source = build_campaign_source(&config)?;
    store.refresh(source.as_ref()).await;

    let validator = ShareValidator::new(store, config.validation_mode()?);

    let file = std::fs::File::open(path)?;
    let envelopes = read_envelopes(BufReader::new(file))?;
    info!(count = envelopes.len(), path = %path.display(), "Validating events");

    for envelope in envelopes {
        if let Some(output) = validate_envelope(&validator, envelope)? {
            println!("{}", output);
        }
    }

    Ok(())
}
