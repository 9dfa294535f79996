// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kaonashi serve` command implementation.
//!
//! Loads the credential payload, builds the Telegram transport and both
//! lookup clients, and runs the dispatcher until SIGINT or SIGTERM.

use std::sync::Arc;

use kaonashi_agent::{Dispatcher, shutdown};
use kaonashi_config::model::KaonashiConfig;
use kaonashi_core::error::KaonashiError;
use kaonashi_lookup::{BreachClient, MalwareClient};
use kaonashi_telegram::TelegramTransport;
use secrecy::ExposeSecret;
use tracing::info;

/// Runs the `kaonashi serve` command.
///
/// A missing or incomplete credential payload is fatal here. Once running,
/// the payload can only change through an upload from the recipient.
pub async fn run_serve(config: KaonashiConfig) -> Result<(), KaonashiError> {
    init_tracing(&config.agent.log_level);

    info!("starting kaonashi serve");

    let store = match kaonashi_config::open_credentials(&config) {
        Ok(store) => Arc::new(store),
        Err(errors) => {
            kaonashi_config::render_errors(&errors);
            return Err(KaonashiError::Config(format!(
                "cannot start without a valid credential payload at {}",
                config.credentials.path
            )));
        }
    };
    let credentials = store.current();

    let transport = TelegramTransport::new(
        credentials.transport_token.expose_secret(),
        &config.telegram,
    )?;
    let breach = Arc::new(BreachClient::new(&config.breach)?);
    let malware = Arc::new(MalwareClient::new(&config.malware)?);

    let mut dispatcher = Dispatcher::new(Box::new(transport), breach, malware, store, &config)?;

    let cancel = shutdown::install_signal_handler();
    dispatcher.run(cancel).await?;

    info!("kaonashi stopped");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kaonashi={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
