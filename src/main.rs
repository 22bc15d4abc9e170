use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battle_arena::api::ArenaApi;
use battle_arena::arena::{LeaderboardArena, RefreshScheduler, TournamentBook};
use battle_arena::config::ArenaConfig;
use battle_arena::portfolio::SnapshotEngine;
use battle_arena::transport::UpdateBus;
use battle_arena::zerion::ZerionClient;

const CONFIG_PATH: &str = "Arena.toml";

fn init_tracing() -> Result<()> {
    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("logs")?;

    // Create file appender for logs
    let file_appender = tracing_appender::rolling::daily("logs", "arena.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    // Create console layer with formatting
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    // Create file layer with JSON formatting
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .json()
        .with_current_span(false)
        .with_span_list(true);

    // Initialize subscriber with both console and file layers
    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Leak the guard to prevent the file appender from being dropped
    std::mem::forget(_guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("🏆 Portfolio Battle Arena");
    info!("=========================");

    let config = ArenaConfig::load_or_default(CONFIG_PATH);

    let client = Arc::new(ZerionClient::new(&config.zerion)?);
    if client.is_configured() {
        info!("🔑 Zerion API key configured");
    } else {
        warn!("🔑 No Zerion API key, serving synthetic portfolios");
    }

    let engine = Arc::new(SnapshotEngine::new(
        client,
        Duration::from_secs(config.zerion.request_timeout_secs),
    ));
    let bus = Arc::new(UpdateBus::new());
    let (kick_tx, kick_rx) = mpsc::channel(1);
    let arena = Arc::new(LeaderboardArena::new(
        engine,
        Arc::clone(&bus),
        kick_tx,
        config.refresh.max_concurrent_fetches,
    ));
    let tournaments = Arc::new(TournamentBook::new());
    let api = ArenaApi::new(Arc::clone(&arena), Arc::clone(&tournaments));

    // Populate the leaderboard before anything subscribes, then run the
    // first cycle inline so startup data is as live as the vendor allows
    arena.seed_known_wallets()?;
    arena.refresh_all().await;

    let health = api.health().await;
    info!(
        wallets = health.wallets,
        data_source = health.data_source,
        "✅ Arena ready"
    );

    let (shutdown_tx, _) = broadcast::channel(16);
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    // Periodic refresh driver
    let scheduler = RefreshScheduler::new(
        Arc::clone(&arena),
        Duration::from_secs(config.refresh.interval_secs),
        kick_rx,
        shutdown_tx.subscribe(),
    );
    tasks.push(tokio::spawn(scheduler.run()));

    // Log published rollups so cycles are visible without a subscriber
    let mut analytics_rx = bus.subscribe_analytics();
    let mut logger_shutdown = shutdown_tx.subscribe();
    tasks.push(tokio::spawn(async move {
        loop {
            tokio::select! {
                event = analytics_rx.recv() => match event {
                    Ok(rollup) => debug!(
                        tracked = rollup.tracked_wallets,
                        authoritative = rollup.authoritative_wallets,
                        average_score = rollup.average_score,
                        "Analytics rollup published"
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Analytics subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = logger_shutdown.recv() => break,
            }
        }
    }));

    info!("🎯 Arena is live, press Ctrl+C to shut down");

    match signal::ctrl_c().await {
        Ok(()) => info!("🛑 Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }

    let _ = shutdown_tx.send(());
    for (i, task) in tasks.drain(..).enumerate() {
        match task.await {
            Ok(()) => info!("✅ Task {} shut down cleanly", i + 1),
            Err(e) => error!("❌ Task {} failed: {}", i + 1, e),
        }
    }

    info!("👋 Arena shutdown complete");
    Ok(())
}
