// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `murmur serve` command implementation.
//!
//! Wires the SQLite store, the Gemini provider, the Telegram channel, and
//! the admin HTTP surface together, then enters the relay loop until a
//! shutdown signal arrives.

use std::sync::Arc;

use murmur_admin::AdminState;
use murmur_agent::shutdown;
use murmur_agent::{AgentLoop, Pipeline, Responder};
use murmur_config::model::MurmurConfig;
use murmur_core::{ChannelAdapter, MurmurError, PluginAdapter, StorageAdapter};
use murmur_gemini::GeminiProvider;
use murmur_storage::{SqliteStorage, StoreGateway};
use murmur_telegram::TelegramChannel;
use tracing::{error, info, warn};

/// Runs the `murmur serve` command.
///
/// A storage fault at startup is not fatal: the relay runs degraded and
/// keeps answering, it just stops remembering. Missing credentials for the
/// channel or the provider are fatal, since the relay cannot function
/// without either.
pub async fn run_serve(config: MurmurConfig) -> Result<(), MurmurError> {
    init_tracing(&config.agent.log_level);

    info!("starting murmur serve");

    // Storage first, so the gateway can probe it before traffic arrives.
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    if let Err(e) = storage.initialize().await {
        warn!(error = %e, "storage initialization failed; relay will run degraded");
    }
    let gateway =
        Arc::new(StoreGateway::connect(storage.clone() as Arc<dyn StorageAdapter>).await);

    let provider = GeminiProvider::new(&config.gemini).map_err(|e| {
        error!(error = %e, "failed to initialize Gemini provider");
        eprintln!(
            "error: Gemini API key required. Set gemini.api_key in the config file or the MURMUR_GEMINI_API_KEY environment variable."
        );
        e
    })?;
    let provider = Arc::new(provider);

    let mut telegram = TelegramChannel::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram channel");
        eprintln!(
            "error: Telegram bot token required. Set telegram.bot_token in the config file or the MURMUR_TELEGRAM_BOT_TOKEN environment variable."
        );
        e
    })?;
    telegram.connect().await?;
    let inbound_tx = telegram.inbound_sender();
    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);

    // Admin surface runs beside the relay; its webhook endpoint feeds the
    // same intake queue as long polling.
    let admin_state = AdminState::new(gateway.clone(), inbound_tx);
    let admin_config = config.admin.clone();
    tokio::spawn(async move {
        if let Err(e) = murmur_admin::start_server(&admin_config, admin_state).await {
            error!(error = %e, "admin server exited");
        }
    });

    let responder = Arc::new(Responder::new(
        provider,
        config.agent.system_prompt.clone(),
        config.gemini.temperature,
        config.gemini.max_output_tokens,
    ));
    let pipeline = Arc::new(Pipeline::new(
        gateway,
        responder,
        channel.clone(),
        config.agent.history_window,
    ));

    let cancel = shutdown::install_signal_handler();
    let agent = AgentLoop::new(channel, pipeline);
    agent.run(cancel).await?;

    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }

    info!("murmur serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("murmur={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
