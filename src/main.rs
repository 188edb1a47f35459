use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cloudtorrent::app;
use cloudtorrent::config::settings::AppConfig;
use cloudtorrent::infrastructure::aria2::Aria2Client;
use cloudtorrent::infrastructure::ffmpeg::Toolchain;
use cloudtorrent::infrastructure::torrent::MagnetBook;
use cloudtorrent::modules::conversion::service::JobManager;
use cloudtorrent::state::AppState;
use cloudtorrent::ws::{Broadcaster, ConnectionRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cloudtorrent=info,tower_http=info")),
        )
        .init();

    info!("Starting server...");
    let config = AppConfig::new();

    let toolchain = Toolchain::detect(config.ffmpeg_bin.as_deref(), config.ffprobe_bin.as_deref());
    if toolchain.is_some() {
        info!("✅ ffmpeg and ffprobe detected, conversions enabled");
    } else {
        warn!("⚠️ ffmpeg or ffprobe not found, conversions disabled");
    }
    let jobs = Arc::new(JobManager::new(toolchain));

    let downloads = Arc::new(Aria2Client::connect(&config).await?);
    let torrents = Arc::new(MagnetBook::new());

    let registry = Arc::new(ConnectionRegistry::new());
    let (broadcaster, queue) = Broadcaster::new(registry.clone(), config.queue_capacity());
    let delivery = broadcaster.spawn_delivery(queue);

    let state = AppState::new(config.clone(), jobs, torrents, downloads, broadcaster.clone());
    let aggregator = state
        .aggregator
        .clone()
        .spawn(broadcaster, config.broadcast_interval());

    let app = app::create_app(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    aggregator.abort();
    registry.shutdown_all().await;
    delivery.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
