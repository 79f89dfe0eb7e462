//! Strictly RPS - bot binary
//!
//! Loads configuration, connects to Telegram and runs until a shutdown signal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use strictly_rps::{BotConfig, ConfigOverrides, run_telegram};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Run {
            config,
            token,
            chats_file,
            save_interval,
            move_timeout,
            recruit_timeout,
        } => {
            let overrides = ConfigOverrides {
                token,
                chats_file,
                save_interval_secs: save_interval,
                move_timeout_secs: move_timeout,
                recruit_timeout_secs: recruit_timeout,
            };
            let config = load_config(config.as_deref())?.apply(overrides)?;
            run_bot(config).await
        }
        Command::CheckConfig { config } => {
            let config = load_config(config.as_deref())?.apply(ConfigOverrides::default())?;
            println!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

/// Runs the bot, cancelling it on SIGINT or SIGTERM.
#[instrument(skip(config))]
async fn run_bot(config: BotConfig) -> Result<()> {
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Failed to listen for signals, shutting down"),
        }
        signal_token.cancel();
    });

    info!("Starting strictly_rps");
    run_telegram(config, shutdown).await
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Loads the config file if given, defaults otherwise.
#[instrument]
fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    match path {
        Some(path) => Ok(BotConfig::from_file(path)?),
        None => {
            info!("No config file given, using defaults");
            Ok(BotConfig::default())
        }
    }
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_rps=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
