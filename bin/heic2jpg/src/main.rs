//! heic2jpg – entry point.
//!
//! Startup order:
//! 1. Parse command-line arguments and environment configuration.
//! 2. Initialise tracing (JSON with `HEIC2JPG_LOG_JSON=1`, plain otherwise).
//! 3. Build the conversion client.
//! 4. Run the requested command.

mod cli;
mod commands;
mod config;

use clap::Parser;
use heic2jpg_client::ClientBuilder;
use tracing::{debug, error};

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cli = Cli::parse();
    let cfg = AppConfig::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    // ── 3. Client ──────────────────────────────────────────────────────────────
    let client_cfg = cli.apply_overrides(cfg.client.clone());
    let client = ClientBuilder::from_config(client_cfg).build()?;
    debug!(base_url = %client.base_url(), "client ready");

    // ── 4. Command ─────────────────────────────────────────────────────────────
    let outcome = match cli.command {
        Command::Convert(args) => commands::convert(&client, args).await,
        Command::Download {
            url,
            output,
            filename,
        } => commands::download(&client, &url, &output, filename.as_deref()).await,
        Command::Health => commands::health(&client).await,
    };
    if let Err(e) = &outcome {
        error!(error = %e, "command failed");
    }
    outcome
}

/// Logs go to stderr so stdout only carries results.
fn init_tracing(cfg: &AppConfig) {
    // Warn loudly if the configured value is not a valid filter expression.
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: HEIC2JPG_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                tracing_subscriber::EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
