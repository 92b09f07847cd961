//! Interaction webhook bot - entry point.

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use webhook_bot::api::{create_router, AppState};
use webhook_bot::config::Config;
use webhook_bot::{BotResult, Dispatcher};

#[tokio::main]
async fn main() -> BotResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.log.level);

    info!("Starting interaction webhook bot...");

    let counter = config.counter.build_store()?;

    if counter.health_check().await {
        info!("Counter store healthy ({:?} backend)", config.counter.backend);
    } else {
        warn!("Counter store health check failed - stats will be unavailable until it recovers");
    }

    let dispatcher = Dispatcher::from_config(&config, counter)?;
    info!(
        "Registered {} commands: {}",
        dispatcher.commands().len(),
        dispatcher.commands().names().join(", ")
    );

    match (&config.discord.public_key, config.discord.enforce_signature) {
        (None, _) => warn!("No DISCORD__PUBLIC_KEY set - request signatures are not checked"),
        (Some(_), false) => info!("Signature failures will be logged but not rejected"),
        (Some(_), true) => info!("Signature verification enforced"),
    }

    let app = create_router(AppState::new(dispatcher));

    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .context("Invalid SERVER__LISTEN_ADDR")?,
        config.server.port,
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
