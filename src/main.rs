//! TTS Client - command-line front end for a text-to-speech service.
//!
//! Identifies the device, keeps its remaining-generation balance in sync with the account
//! service, and drives speech generation and checkout against the service's JSON API.

mod api;
mod commands;
mod config;
mod identity;
mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::CommandFactory;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;

use api::AccountClient;
use commands::{generate, pricing, success};
use config::{AppConfig, Command};
use identity::MachineFingerprint;
use session::SessionStore;

/// Run a single command against an initialized session.
async fn run_command(command: Command, config: &AppConfig, store: &SessionStore, client: &AccountClient) -> Result<()> {
    match command {
        Command::Status => {
            commands::print_status(&store.snapshot());
        }
        Command::Generate { text, file, voice, speed, output } => {
            let text = generate::read_text(text, file).await?;
            generate::run(store, client, &text, &voice, speed, &output).await?;
            println!("Saved audio to {}", output.display());
            commands::print_status(&store.snapshot());
        }
        Command::Pricing => {
            pricing::print_pricing();
        }
        Command::Checkout { tier, allow_fallback_id } => {
            let url = pricing::checkout(store, client, tier, &config.success_url(), allow_fallback_id).await?;
            println!("Complete your purchase at:");
            println!("  {}", url);
        }
        Command::PaymentSuccess { delay_ms } => {
            let session = success::run(store, Duration::from_millis(delay_ms)).await;
            if session.is_confirmed {
                println!("✅ Payment received");
            } else {
                println!("⚠️  Could not confirm the new balance yet, check again with `tts-client status`");
            }
            commands::print_status(&session);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config = AppConfig::from_args();

    // Respect RUST_LOG env var, fallback to verbose flag, default to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if config.verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(LocalTime::new(time::macros::format_description!("[hour]:[minute]:[second]")))
        .init();

    info!("🔊 TTS Client v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        error!("❌ Configuration error: {}", e);
        std::process::exit(1);
    }

    let Some(command) = config.command.clone() else {
        AppConfig::command().print_help()?;
        return Ok(());
    };

    if config.verbose {
        config.log_config();
    }

    let client = Arc::new(AccountClient::new(&config.api_url));
    let store = SessionStore::new(Arc::new(MachineFingerprint::default()), client.clone());
    store.initialize().await;

    let result = tokio::select! {
        result = run_command(command, &config, &store, &client) => result,
        _ = signal::ctrl_c() => {
            info!("🛑 Received Ctrl+C, stopping");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
