/// Broadcast bus carrying refresh results to subscribers
///
/// Three typed channels mirror the public event streams:
/// - leaderboard: full ranked summaries after every refresh cycle
/// - analytics: the platform rollup
/// - wallet updates: the per-cycle batch of wallet deltas
///
/// On top of those, per-address rooms deliver just one wallet's deltas to
/// interested subscribers. Rooms are created lazily and pruned once their
/// last receiver is gone. Publishing never blocks and never fails; a send
/// with no subscribers is simply dropped.
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use crate::core::{Address, ArenaAnalytics, WalletSummary, WalletUpdate};

const LEADERBOARD_CAPACITY: usize = 64;
const ANALYTICS_CAPACITY: usize = 64;
const UPDATES_CAPACITY: usize = 256;
const ROOM_CAPACITY: usize = 64;

/// Counters for monitoring bus activity
#[derive(Debug, Default)]
pub struct BusStatistics {
    pub leaderboard_published: AtomicU64,
    pub analytics_published: AtomicU64,
    pub update_batches_published: AtomicU64,
}

pub struct UpdateBus {
    leaderboard_tx: broadcast::Sender<Vec<WalletSummary>>,
    analytics_tx: broadcast::Sender<ArenaAnalytics>,
    updates_tx: broadcast::Sender<Vec<WalletUpdate>>,
    rooms: DashMap<Address, broadcast::Sender<WalletUpdate>>,
    stats: BusStatistics,
}

impl UpdateBus {
    pub fn new() -> Self {
        debug!(
            leaderboard = LEADERBOARD_CAPACITY,
            updates = UPDATES_CAPACITY,
            "UpdateBus initialized"
        );
        let (leaderboard_tx, _) = broadcast::channel(LEADERBOARD_CAPACITY);
        let (analytics_tx, _) = broadcast::channel(ANALYTICS_CAPACITY);
        let (updates_tx, _) = broadcast::channel(UPDATES_CAPACITY);
        Self {
            leaderboard_tx,
            analytics_tx,
            updates_tx,
            rooms: DashMap::new(),
            stats: BusStatistics::default(),
        }
    }

    pub fn publish_leaderboard(&self, summaries: Vec<WalletSummary>) {
        self.stats
            .leaderboard_published
            .fetch_add(1, Ordering::Relaxed);
        if let Ok(subscriber_count) = self.leaderboard_tx.send(summaries) {
            debug!(subscriber_count, "Published leaderboard update");
        }
    }

    pub fn publish_analytics(&self, analytics: ArenaAnalytics) {
        self.stats
            .analytics_published
            .fetch_add(1, Ordering::Relaxed);
        if let Ok(subscriber_count) = self.analytics_tx.send(analytics) {
            debug!(subscriber_count, "Published analytics update");
        }
    }

    /// Broadcast a refresh cycle's wallet deltas and route each one to its
    /// address room. Empty batches are not published.
    pub fn publish_wallet_updates(&self, updates: Vec<WalletUpdate>) {
        if updates.is_empty() {
            return;
        }
        self.stats
            .update_batches_published
            .fetch_add(1, Ordering::Relaxed);

        // Drop rooms whose subscribers have all gone away
        self.rooms.retain(|_, tx| tx.receiver_count() > 0);

        for update in &updates {
            if let Ok(address) = Address::parse(&update.address) {
                if let Some(room) = self.rooms.get(&address) {
                    let _ = room.send(update.clone());
                }
            }
        }

        if let Ok(subscriber_count) = self.updates_tx.send(updates) {
            debug!(subscriber_count, "Published wallet update batch");
        }
    }

    pub fn subscribe_leaderboard(&self) -> broadcast::Receiver<Vec<WalletSummary>> {
        self.leaderboard_tx.subscribe()
    }

    pub fn subscribe_analytics(&self) -> broadcast::Receiver<ArenaAnalytics> {
        self.analytics_tx.subscribe()
    }

    pub fn subscribe_wallet_updates(&self) -> broadcast::Receiver<Vec<WalletUpdate>> {
        self.updates_tx.subscribe()
    }

    /// Subscribe to a single wallet's deltas. The room is created on first
    /// join and reclaimed once its last receiver drops.
    pub fn join_room(&self, address: &Address) -> broadcast::Receiver<WalletUpdate> {
        self.rooms
            .entry(address.clone())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn stats(&self) -> &BusStatistics {
        &self.stats
    }
}

impl Default for UpdateBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn update_for(address: &str, score: i64) -> WalletUpdate {
        WalletUpdate {
            address: address.to_string(),
            score,
            total_value: 1_000.0,
            total_pnl: 10.0,
            score_delta: 1,
            is_authoritative: false,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_all_subscribers() {
        let bus = UpdateBus::new();
        let mut first = bus.subscribe_wallet_updates();
        let mut second = bus.subscribe_wallet_updates();

        bus.publish_wallet_updates(vec![update_for(
            "0x1111111111111111111111111111111111111111",
            50,
        )]);

        assert_eq!(first.recv().await.unwrap().len(), 1);
        assert_eq!(second.recv().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rooms_receive_only_their_wallet() {
        let bus = UpdateBus::new();
        let watched = Address::parse("0x1111111111111111111111111111111111111111").unwrap();
        let mut room = bus.join_room(&watched);

        bus.publish_wallet_updates(vec![
            update_for("0x2222222222222222222222222222222222222222", 10),
            update_for(watched.as_str(), 99),
        ]);

        let delta = room.recv().await.unwrap();
        assert_eq!(delta.address, watched.as_str());
        assert_eq!(delta.score, 99);
        // Nothing else was routed into the room
        assert!(room.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_batches_are_not_published() {
        let bus = UpdateBus::new();
        let mut rx = bus.subscribe_wallet_updates();
        bus.publish_wallet_updates(Vec::new());
        assert!(rx.try_recv().is_err());
        assert_eq!(
            bus.stats().update_batches_published.load(Ordering::Relaxed),
            0
        );
    }

    #[tokio::test]
    async fn abandoned_rooms_are_pruned() {
        let bus = UpdateBus::new();
        let address = Address::parse("0x3333333333333333333333333333333333333333").unwrap();
        let receiver = bus.join_room(&address);
        assert_eq!(bus.active_rooms(), 1);

        drop(receiver);
        bus.publish_wallet_updates(vec![update_for(
            "0x4444444444444444444444444444444444444444",
            1,
        )]);
        assert_eq!(bus.active_rooms(), 0);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_harmless() {
        let bus = UpdateBus::new();
        bus.publish_leaderboard(Vec::new());
        bus.publish_analytics(ArenaAnalytics::empty(Utc::now()));
        bus.publish_wallet_updates(vec![update_for(
            "0x5555555555555555555555555555555555555555",
            1,
        )]);
        assert_eq!(
            bus.stats().leaderboard_published.load(Ordering::Relaxed),
            1
        );
        assert_eq!(bus.stats().analytics_published.load(Ordering::Relaxed), 1);
    }
}
