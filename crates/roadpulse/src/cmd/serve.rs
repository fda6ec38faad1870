//! Serve command - run the ingestion server
//!
//! Starts the HTTP API and the channel listener over one store, one
//! subscription registry and one ingestion service, and runs until SIGINT or
//! SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use roadpulse_api::{AppState, build_router};
use roadpulse_config::{Config, ServerConfig};
use roadpulse_pipeline::{ChannelListener, ChannelListenerConfig, IngestionService};
use roadpulse_store::open_store;
use roadpulse_tap::{Distributor, SubscriptionRegistry};

/// Time allowed for each task to stop after the shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve command arguments
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override `server.database` (`memory`, `:memory:` or a file path)
    #[arg(long)]
    pub database: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(database) = args.database {
        config.server.database = database;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        "roadpulse starting"
    );

    if let Err(e) = run_server(config.server).await {
        error!(error = %e, "server error");
        return Err(e);
    }

    info!("roadpulse shutdown complete");
    Ok(())
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let cancel = CancellationToken::new();

    let store = open_store(&config.database)
        .await
        .with_context(|| format!("failed to open store '{}'", config.database))?;
    info!(database = %config.database, records = store.count().await?, "store opened");

    let registry = Arc::new(SubscriptionRegistry::new());
    let distributor = Distributor::new(Arc::clone(&registry), config.delivery_timeout);
    let ingestion = Arc::new(IngestionService::new(store, distributor));

    // Channel listener
    let channel_listener = ChannelListener::new(
        ChannelListenerConfig {
            address: config.channel_address.clone(),
            default_road_state: config.default_road_state.clone(),
        },
        Arc::clone(&ingestion),
    );
    let listener = channel_listener
        .bind()
        .await
        .context("failed to bind channel listener")?;
    let channel_task = tokio::spawn(channel_listener.serve(listener, cancel.clone()));

    // HTTP API
    let state = AppState::new(ingestion).with_observer_queue(config.observer_queue);
    let app = build_router(state).layer(TraceLayer::new_for_http());
    let http_listener = TcpListener::bind(&config.http_address)
        .await
        .with_context(|| format!("failed to bind HTTP API on {}", config.http_address))?;
    info!(addr = %config.http_address, "HTTP API listening");

    let http_cancel = cancel.clone();
    let http_task = tokio::spawn(async move {
        axum::serve(http_listener, app)
            .with_graceful_shutdown(async move {
                http_cancel.cancelled().await;
            })
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "HTTP API error");
            });
    });

    info!(
        http_address = %config.http_address,
        channel_address = %config.channel_address,
        "roadpulse server running"
    );

    wait_for_shutdown().await;

    info!("shutdown signal received, stopping server...");
    cancel.cancel();

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, channel_task).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => warn!(error = %e, "channel listener stopped with error"),
        Ok(Err(e)) => warn!(error = %e, "channel listener panicked"),
        Err(_) => warn!("channel listener did not stop within timeout"),
    }
    match tokio::time::timeout(SHUTDOWN_TIMEOUT, http_task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "HTTP API task panicked"),
        Err(_) => warn!("HTTP API did not stop within timeout"),
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
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
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
