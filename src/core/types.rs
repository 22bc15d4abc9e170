/// Core data types for the portfolio battle arena
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::address::Address;

/// Maximum length of a wallet comment, in characters
pub const MAX_COMMENT_CHARS: usize = 500;

/// Single asset position inside a portfolio breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPosition {
    /// Ticker symbol, e.g. "ETH"
    pub symbol: String,

    /// Human-readable asset name
    pub name: String,

    /// Token quantity held (never negative)
    pub quantity: f64,

    /// Price per unit in USD
    #[serde(rename = "price")]
    pub unit_price: f64,

    /// Position value in USD (quantity * unit price)
    pub value: f64,

    /// Share of the portfolio total, 0-100
    pub percentage: f64,
}

/// Canonical valuation of one wallet at a point in time.
///
/// Produced either by the normalizer (vendor data) or the synthetic
/// generator; `is_authoritative` tells the two apart everywhere downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// Total portfolio value in USD
    pub total_value: f64,

    /// Absolute profit and loss in USD
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,

    /// PnL as a percentage of total value
    pub pnl_percentage: f64,

    /// Asset breakdown, at most 10 entries, descending by value
    pub assets: Vec<AssetPosition>,

    /// Risk score in 0-100 (higher = riskier)
    pub risk_score: f64,

    /// Sharpe ratio clamped to 0-2
    pub sharpe_ratio: f64,

    /// Maximum drawdown percentage, capped at 50
    pub max_drawdown: f64,

    /// Win rate in 0-1
    pub win_rate: f64,

    /// Average trade size in USD
    pub avg_trade_size: f64,

    /// Number of recent transactions observed
    pub transaction_count: u64,

    /// Timestamp of the most recent trade, when known
    pub last_trade: Option<DateTime<Utc>>,

    /// True when the valuation came from live vendor data
    pub is_authoritative: bool,
}

/// Comment left on a wallet's battle page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,

    /// Comment body, trimmed, 1..=500 characters
    #[serde(rename = "comment")]
    pub text: String,

    /// Address string of the author, "anonymous" when not supplied
    pub author_address: String,

    /// Display name of the author, "Anonymous" when not supplied
    pub author_name: String,

    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,

    pub likes: u32,
}

/// Full in-memory state of one tracked wallet.
///
/// Owned exclusively by the leaderboard arena; reads hand out projections
/// (`WalletSummary`, `WalletDetail`), never references into this struct.
#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub address: Address,
    pub display_name: String,
    pub description: String,
    pub joined_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub snapshot: PortfolioSnapshot,
    /// Current synthetic score (rounded)
    pub score: i64,
    /// Score movement applied by the most recent refresh
    pub score_delta: i64,
    pub followers: HashSet<Address>,
    pub comments: Vec<Comment>,
}

/// Leaderboard row projection of a wallet record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    /// 1-based position under the current sort; absent outside ranked reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
    pub address: String,
    pub display_name: String,
    pub description: String,
    pub score: i64,
    pub score_delta: i64,
    pub total_value: f64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub pnl_percentage: f64,
    pub win_rate: f64,
    pub risk_score: f64,
    pub sharpe_ratio: f64,
    pub transactions: u64,
    pub followers: usize,
    pub comments: usize,
    pub joined_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_authoritative: bool,
}

/// Detailed wallet view returned by single-wallet reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDetail {
    pub rank: Option<u64>,
    pub address: String,
    pub display_name: String,
    pub description: String,
    pub score: i64,
    pub score_delta: i64,
    pub total_value: f64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub pnl_percentage: f64,
    pub joined_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_authoritative: bool,
    pub portfolio: PortfolioSnapshot,
    /// Addresses currently following this wallet
    pub followers: Vec<String>,
    pub comments: Vec<Comment>,
    pub analytics: WalletAnalytics,
}

/// Per-wallet analytics block embedded in the detail view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAnalytics {
    pub total_trades: u64,
    pub win_rate: f64,
    pub risk_score: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub avg_trade_size: f64,
    pub is_authoritative: bool,
}

/// Per-wallet delta published after each refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletUpdate {
    pub address: String,
    pub score: i64,
    pub total_value: f64,
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    pub score_delta: i64,
    pub is_authoritative: bool,
    pub timestamp: DateTime<Utc>,
}

/// Platform-wide rollup recomputed at the end of every refresh cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaAnalytics {
    pub total_trades: u64,
    pub total_volume: f64,
    pub average_score: f64,
    pub market_cap: f64,
    pub authoritative_wallets: usize,
    pub tracked_wallets: usize,
    pub last_updated: DateTime<Utc>,
}

impl ArenaAnalytics {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_trades: 0,
            total_volume: 0.0,
            average_score: 0.0,
            market_cap: 0.0,
            authoritative_wallets: 0,
            tracked_wallets: 0,
            last_updated: now,
        }
    }
}

/// 1-based pagination envelope shared by every list response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(limit),
        }
    }

    /// Index of the first row on this page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

/// Tournament lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Upcoming,
    Active,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Time-boxed competition wallets can join
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Duration in hours
    #[serde(rename = "duration")]
    pub duration_hours: u64,
    pub prize: String,
    pub rules: Vec<String>,
    pub max_participants: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Join order is preserved; duplicates are rejected
    pub participants: Vec<Address>,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}
