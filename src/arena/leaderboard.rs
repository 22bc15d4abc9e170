/// Wallet arena: roster, refresh cycles, ranking and social state.
///
/// All wallet state lives behind one `RwLock`; vendor fetches happen strictly
/// outside it, so a slow upstream never blocks reads. Refresh cycles are
/// serialized through a `try_lock`ed mutex and publish their results on the
/// update bus after the write lock is released.
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiError;
use crate::core::{
    Address, ArenaAnalytics, Comment, Pagination, WalletAnalytics, WalletDetail, WalletRecord,
    WalletSummary, WalletUpdate, MAX_COMMENT_CHARS,
};
use crate::portfolio::{fallback, SnapshotEngine};
use crate::scoring;
use crate::transport::UpdateBus;

use super::registry::KNOWN_WALLETS;

/// Seed wallets present as having joined one week before startup
const SEED_BACKDATE_DAYS: i64 = 7;

/// Ranked sort orders accepted by leaderboard reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Score,
    Value,
    Pnl,
    Joined,
}

impl SortKey {
    /// Parse a query value; anything unrecognized falls back to score order
    pub fn parse(raw: &str) -> Self {
        match raw {
            "value" => Self::Value,
            "pnl" => Self::Pnl,
            "joined" => Self::Joined,
            _ => Self::Score,
        }
    }
}

/// One page of the ranked leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub wallets: Vec<WalletSummary>,
    pub pagination: Pagination,
    pub data_source: String,
    pub authoritative_count: usize,
}

/// Result of a follow toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOutcome {
    pub is_following: bool,
    pub followers_count: usize,
}

#[derive(Default)]
struct ArenaState {
    records: HashMap<Address, WalletRecord>,
    /// Registration order; ranked sorts break ties with it
    roster: Vec<Address>,
}

pub struct LeaderboardArena {
    engine: Arc<SnapshotEngine>,
    bus: Arc<UpdateBus>,
    state: RwLock<ArenaState>,
    analytics: RwLock<ArenaAnalytics>,
    /// Held for the duration of a refresh cycle so cycles never overlap
    cycle: tokio::sync::Mutex<()>,
    kick_tx: mpsc::Sender<()>,
    max_concurrent_fetches: usize,
    next_comment_id: AtomicU64,
}

impl LeaderboardArena {
    pub fn new(
        engine: Arc<SnapshotEngine>,
        bus: Arc<UpdateBus>,
        kick_tx: mpsc::Sender<()>,
        max_concurrent_fetches: usize,
    ) -> Self {
        Self {
            engine,
            bus,
            state: RwLock::new(ArenaState::default()),
            analytics: RwLock::new(ArenaAnalytics::empty(Utc::now())),
            cycle: tokio::sync::Mutex::new(()),
            kick_tx,
            max_concurrent_fetches: max_concurrent_fetches.max(1),
            next_comment_id: AtomicU64::new(1),
        }
    }

    /// Put a new wallet into the battle.
    ///
    /// The first snapshot is fetched before the wallet becomes visible, so a
    /// registered wallet never appears with empty data. A full refresh cycle
    /// is kicked afterwards instead of being awaited here.
    #[instrument(skip_all, fields(wallet = %address))]
    pub async fn register(
        &self,
        address: Address,
        display_name: Option<String>,
        description: Option<String>,
    ) -> Result<WalletSummary, ApiError> {
        if self.state.read().unwrap().records.contains_key(&address) {
            return Err(ApiError::WalletExists);
        }

        let snapshot = self.engine.bootstrap(&address).await;
        let now = Utc::now();
        let breakdown = scoring::score(&snapshot, now, now);

        let record = WalletRecord {
            address: address.clone(),
            display_name: display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Trader {}", address.short())),
            description: description.unwrap_or_default(),
            joined_at: now,
            last_updated: now,
            snapshot,
            score: breakdown.total,
            score_delta: 0,
            followers: HashSet::new(),
            comments: Vec::new(),
        };

        let summary = {
            let mut state = self.state.write().unwrap();
            // A racing registration may have won between the check and here
            if state.records.contains_key(&address) {
                return Err(ApiError::WalletExists);
            }
            let summary = summarize(&record);
            state.roster.push(address.clone());
            state.records.insert(address.clone(), record);
            summary
        };

        info!(
            score = summary.score,
            total_value = summary.total_value,
            authoritative = summary.is_authoritative,
            "⚔️ Wallet joined the arena"
        );
        self.kick();
        Ok(summary)
    }

    /// Seed the roster with well-known addresses so a fresh arena starts
    /// populated. Snapshots begin synthetic; the first refresh cycle upgrades
    /// them once live data is reachable.
    pub fn seed_known_wallets(&self) -> Result<usize, ApiError> {
        let now = Utc::now();
        let joined_at = now - Duration::days(SEED_BACKDATE_DAYS);
        let mut seeded = 0usize;

        {
            let mut state = self.state.write().unwrap();
            for entry in KNOWN_WALLETS {
                let address = Address::parse(entry.address)?;
                if state.records.contains_key(&address) {
                    continue;
                }

                let snapshot = fallback::generate(&address, now);
                let breakdown = scoring::score(&snapshot, joined_at, now);
                let record = WalletRecord {
                    address: address.clone(),
                    display_name: entry.name.to_string(),
                    description: entry.description.to_string(),
                    joined_at,
                    last_updated: now,
                    snapshot,
                    score: breakdown.total,
                    score_delta: 0,
                    followers: HashSet::new(),
                    comments: Vec::new(),
                };
                state.roster.push(address.clone());
                state.records.insert(address, record);
                seeded += 1;
            }
        }

        info!(seeded, total = self.wallet_count(), "📋 Seeded known wallets");
        Ok(seeded)
    }

    /// Run one full refresh cycle: fetch every tracked wallet, rescore,
    /// rebuild analytics and publish the results on the bus.
    ///
    /// Returns false when another cycle is still running.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> bool {
        let Ok(_guard) = self.cycle.try_lock() else {
            debug!("Refresh cycle still running, skipping this round");
            return false;
        };

        let roster: Vec<Address> = self.state.read().unwrap().roster.clone();
        if roster.is_empty() {
            debug!("No wallets to refresh");
            return true;
        }

        let started = Instant::now();
        let fetches = roster.into_iter().map(|address| async move {
            let outcome = self.engine.refresh(&address).await;
            (address, outcome)
        });
        let results: Vec<_> = stream::iter(fetches)
            .buffer_unordered(self.max_concurrent_fetches)
            .collect()
            .await;

        let now = Utc::now();
        let mut updates: Vec<WalletUpdate> = Vec::new();
        let mut failed = 0usize;

        let (ranked, analytics) = {
            let mut state = self.state.write().unwrap();
            for (address, outcome) in results {
                match outcome {
                    Ok(snapshot) => {
                        if let Some(record) = state.records.get_mut(&address) {
                            let breakdown = scoring::score(&snapshot, record.joined_at, now);
                            record.score_delta = breakdown.total - record.score;
                            record.score = breakdown.total;
                            record.snapshot = snapshot;
                            record.last_updated = now;
                            updates.push(WalletUpdate {
                                address: record.address.to_string(),
                                score: record.score,
                                total_value: record.snapshot.total_value,
                                total_pnl: record.snapshot.total_pnl,
                                score_delta: record.score_delta,
                                is_authoritative: record.snapshot.is_authoritative,
                                timestamp: now,
                            });
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(
                            wallet = %address,
                            error = %e,
                            "Refresh failed, retaining previous snapshot"
                        );
                    }
                }
            }

            (
                ranked_summaries(&state, SortKey::Score),
                compute_analytics(&state.records, now),
            )
        };

        *self.analytics.write().unwrap() = analytics.clone();

        let updated = updates.len();
        let authoritative = analytics.authoritative_wallets;
        self.bus.publish_leaderboard(ranked);
        self.bus.publish_analytics(analytics);
        self.bus.publish_wallet_updates(updates);

        info!(
            updated,
            failed,
            authoritative,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "📊 Leaderboard refreshed"
        );
        true
    }

    /// Refresh one wallet outside the cycle, e.g. ahead of a detail read.
    /// Vendor trouble keeps the previous snapshot and is not an error here.
    #[instrument(skip_all, fields(wallet = %address))]
    pub async fn refresh_wallet(&self, address: &Address) -> Result<(), ApiError> {
        if !self.state.read().unwrap().records.contains_key(address) {
            return Err(ApiError::WalletNotFound);
        }

        match self.engine.refresh(address).await {
            Ok(snapshot) => {
                let now = Utc::now();
                let mut state = self.state.write().unwrap();
                if let Some(record) = state.records.get_mut(address) {
                    let breakdown = scoring::score(&snapshot, record.joined_at, now);
                    record.score_delta = breakdown.total - record.score;
                    record.score = breakdown.total;
                    record.snapshot = snapshot;
                    record.last_updated = now;
                }
            }
            Err(e) => {
                debug!(error = %e, "Single-wallet refresh failed, serving cached snapshot");
            }
        }
        Ok(())
    }

    /// Ranked leaderboard read. Rank is assigned on the full sorted roster,
    /// then the requested page is cut out of it.
    pub async fn leaderboard_page(
        &self,
        sort: SortKey,
        page: usize,
        limit: usize,
    ) -> LeaderboardPage {
        // Resolve the label before locking; the probe may hit the network
        let data_source = self.engine.data_source().await.to_string();

        let state = self.state.read().unwrap();
        let rows = ranked_summaries(&state, sort);
        let authoritative_count = rows.iter().filter(|row| row.is_authoritative).count();

        let pagination = Pagination::new(page.max(1), limit.max(1), rows.len());
        let wallets = rows
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();

        LeaderboardPage {
            wallets,
            pagination,
            data_source,
            authoritative_count,
        }
    }

    /// Detail view; rank is this wallet's position under score order
    pub fn wallet_detail(&self, address: &Address) -> Result<WalletDetail, ApiError> {
        let state = self.state.read().unwrap();
        let record = state.records.get(address).ok_or(ApiError::WalletNotFound)?;

        let rank = ranked_summaries(&state, SortKey::Score)
            .iter()
            .find(|row| row.address == record.address.as_str())
            .and_then(|row| row.rank);

        let mut followers: Vec<String> =
            record.followers.iter().map(|a| a.to_string()).collect();
        followers.sort();

        Ok(WalletDetail {
            rank,
            address: record.address.to_string(),
            display_name: record.display_name.clone(),
            description: record.description.clone(),
            score: record.score,
            score_delta: record.score_delta,
            total_value: record.snapshot.total_value,
            total_pnl: record.snapshot.total_pnl,
            pnl_percentage: record.snapshot.pnl_percentage,
            joined_at: record.joined_at,
            last_updated: record.last_updated,
            is_authoritative: record.snapshot.is_authoritative,
            portfolio: record.snapshot.clone(),
            followers,
            comments: record.comments.clone(),
            analytics: WalletAnalytics {
                total_trades: record.snapshot.transaction_count,
                win_rate: record.snapshot.win_rate,
                risk_score: record.snapshot.risk_score,
                sharpe_ratio: record.snapshot.sharpe_ratio,
                max_drawdown: record.snapshot.max_drawdown,
                avg_trade_size: record.snapshot.avg_trade_size,
                is_authoritative: record.snapshot.is_authoritative,
            },
        })
    }

    /// Follow when not yet following, unfollow when already following
    pub fn toggle_follow(
        &self,
        target: &Address,
        follower: Address,
    ) -> Result<FollowOutcome, ApiError> {
        let mut state = self.state.write().unwrap();
        let record = state
            .records
            .get_mut(target)
            .ok_or(ApiError::WalletNotFound)?;

        let is_following = if record.followers.remove(&follower) {
            false
        } else {
            record.followers.insert(follower);
            true
        };

        Ok(FollowOutcome {
            is_following,
            followers_count: record.followers.len(),
        })
    }

    pub fn add_comment(
        &self,
        target: &Address,
        text: &str,
        author_address: Option<String>,
        author_name: Option<String>,
    ) -> Result<Comment, ApiError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ApiError::EmptyComment);
        }
        if trimmed.chars().count() > MAX_COMMENT_CHARS {
            return Err(ApiError::CommentTooLong);
        }

        let mut state = self.state.write().unwrap();
        let record = state
            .records
            .get_mut(target)
            .ok_or(ApiError::WalletNotFound)?;

        let comment = Comment {
            id: self.next_comment_id.fetch_add(1, Ordering::SeqCst),
            text: trimmed.to_string(),
            author_address: author_address
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| "anonymous".to_string()),
            author_name: author_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            created_at: Utc::now(),
            likes: 0,
        };
        record.comments.push(comment.clone());
        Ok(comment)
    }

    /// All comments on a wallet, oldest first
    pub fn comments(&self, target: &Address) -> Result<Vec<Comment>, ApiError> {
        let state = self.state.read().unwrap();
        let record = state.records.get(target).ok_or(ApiError::WalletNotFound)?;
        Ok(record.comments.clone())
    }

    /// Rollup from the most recent refresh cycle
    pub fn analytics(&self) -> ArenaAnalytics {
        self.analytics.read().unwrap().clone()
    }

    pub fn wallet_count(&self) -> usize {
        self.state.read().unwrap().records.len()
    }

    pub async fn data_source(&self) -> &'static str {
        self.engine.data_source().await
    }

    pub async fn upstream_active(&self) -> bool {
        self.engine.upstream_active().await
    }

    /// Ask the scheduler for an immediate refresh cycle. Lossy on purpose:
    /// a kick already sitting in the channel covers this one too.
    fn kick(&self) {
        let _ = self.kick_tx.try_send(());
    }
}

fn summarize(record: &WalletRecord) -> WalletSummary {
    WalletSummary {
        rank: None,
        address: record.address.to_string(),
        display_name: record.display_name.clone(),
        description: record.description.clone(),
        score: record.score,
        score_delta: record.score_delta,
        total_value: record.snapshot.total_value,
        total_pnl: record.snapshot.total_pnl,
        pnl_percentage: record.snapshot.pnl_percentage,
        win_rate: record.snapshot.win_rate,
        risk_score: record.snapshot.risk_score,
        sharpe_ratio: record.snapshot.sharpe_ratio,
        transactions: record.snapshot.transaction_count,
        followers: record.followers.len(),
        comments: record.comments.len(),
        joined_at: record.joined_at,
        last_updated: record.last_updated,
        is_authoritative: record.snapshot.is_authoritative,
    }
}

fn ranked_summaries(state: &ArenaState, sort: SortKey) -> Vec<WalletSummary> {
    let mut rows: Vec<WalletSummary> = state
        .roster
        .iter()
        .filter_map(|address| state.records.get(address))
        .map(summarize)
        .collect();

    // Stable sort keeps registration order among ties
    match sort {
        SortKey::Score => rows.sort_by(|a, b| b.score.cmp(&a.score)),
        SortKey::Value => rows.sort_by(|a, b| b.total_value.total_cmp(&a.total_value)),
        SortKey::Pnl => rows.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl)),
        SortKey::Joined => rows.sort_by(|a, b| b.joined_at.cmp(&a.joined_at)),
    }

    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = Some(index as u64 + 1);
    }
    rows
}

fn compute_analytics(
    records: &HashMap<Address, WalletRecord>,
    now: DateTime<Utc>,
) -> ArenaAnalytics {
    let tracked = records.len();
    let total_volume: f64 = records.values().map(|r| r.snapshot.total_value).sum();
    let total_trades: u64 = records.values().map(|r| r.snapshot.transaction_count).sum();
    let total_score: f64 = records.values().map(|r| r.score as f64).sum();
    let average_score = if tracked == 0 {
        0.0
    } else {
        total_score / tracked as f64
    };
    let authoritative = records
        .values()
        .filter(|r| r.snapshot.is_authoritative)
        .count();

    ArenaAnalytics {
        total_trades,
        total_volume,
        average_score,
        market_cap: total_volume,
        authoritative_wallets: authoritative,
        tracked_wallets: tracked,
        last_updated: now,
    }
}
