/// Periodic refresh driver.
///
/// Owns the cadence only; the arena owns the work. Registration kicks arrive
/// over a lossy channel so a burst of signups still costs one extra cycle.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use super::LeaderboardArena;

pub struct RefreshScheduler {
    arena: Arc<LeaderboardArena>,
    interval: Duration,
    kick_rx: mpsc::Receiver<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl RefreshScheduler {
    pub fn new(
        arena: Arc<LeaderboardArena>,
        interval: Duration,
        kick_rx: mpsc::Receiver<()>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            arena,
            interval,
            kick_rx,
            shutdown_rx,
        }
    }

    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick completes immediately; the startup refresh already
        // ran, so consume it before entering the loop
        ticker.tick().await;

        info!(
            interval_secs = self.interval.as_secs(),
            "🔄 Refresh scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.arena.refresh_all().await;
                }
                Some(()) = self.kick_rx.recv() => {
                    debug!("Refresh kick received");
                    self.arena.refresh_all().await;
                }
                _ = self.shutdown_rx.recv() => {
                    info!("🛑 Refresh scheduler stopped");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;
    use crate::portfolio::source::testing::ScriptedSource;
    use crate::portfolio::SnapshotEngine;
    use crate::transport::UpdateBus;

    struct Rig {
        arena: Arc<LeaderboardArena>,
        bus: Arc<UpdateBus>,
        kick_tx: mpsc::Sender<()>,
        kick_rx: mpsc::Receiver<()>,
    }

    fn rig() -> Rig {
        let source = Arc::new(ScriptedSource::new(false));
        let engine = Arc::new(SnapshotEngine::new(source, Duration::from_millis(50)));
        let bus = Arc::new(UpdateBus::new());
        let (kick_tx, kick_rx) = mpsc::channel(1);
        let arena = Arc::new(LeaderboardArena::new(
            engine,
            Arc::clone(&bus),
            kick_tx.clone(),
            4,
        ));
        Rig {
            arena,
            bus,
            kick_tx,
            kick_rx,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn kick_runs_a_cycle_without_waiting_for_the_tick() {
        let rig = rig();
        rig.arena
            .register(
                Address::parse("0x1111111111111111111111111111111111111111").unwrap(),
                None,
                None,
            )
            .await
            .unwrap();
        // Drain the kick queued by registration
        let mut kick_rx = rig.kick_rx;
        let _ = kick_rx.try_recv();

        let mut leaderboard_rx = rig.bus.subscribe_leaderboard();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let scheduler = RefreshScheduler::new(
            Arc::clone(&rig.arena),
            Duration::from_secs(3600),
            kick_rx,
            shutdown_rx,
        );
        let handle = tokio::spawn(scheduler.run());

        rig.kick_tx.send(()).await.unwrap();
        let rows = leaderboard_rx.recv().await.unwrap();
        assert_eq!(rows.len(), 1);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_drive_refresh_cycles() {
        let rig = rig();
        rig.arena
            .register(
                Address::parse("0x2222222222222222222222222222222222222222").unwrap(),
                None,
                None,
            )
            .await
            .unwrap();
        let mut kick_rx = rig.kick_rx;
        let _ = kick_rx.try_recv();

        let mut leaderboard_rx = rig.bus.subscribe_leaderboard();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let scheduler = RefreshScheduler::new(
            Arc::clone(&rig.arena),
            Duration::from_secs(30),
            kick_rx,
            shutdown_rx,
        );
        let handle = tokio::spawn(scheduler.run());

        // Two consecutive interval firings, no kicks involved
        leaderboard_rx.recv().await.unwrap();
        leaderboard_rx.recv().await.unwrap();

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_the_loop() {
        let rig = rig();
        let mut kick_rx = rig.kick_rx;
        let _ = kick_rx.try_recv();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let scheduler = RefreshScheduler::new(
            Arc::clone(&rig.arena),
            Duration::from_secs(30),
            kick_rx,
            shutdown_rx,
        );
        let handle = tokio::spawn(scheduler.run());

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
