/// Composite wallet score used for leaderboard ranking
///
/// Rewards portfolio size (log scale), realized performance, risk-adjusted
/// returns, consistency, and tenure, with a flat bonus for wallets valued
/// from live vendor data. The clock is passed in so scores are
/// reproducible in tests.
use chrono::{DateTime, Utc};

use crate::core::PortfolioSnapshot;

const VALUE_WEIGHT: f64 = 15.0;
const PNL_WEIGHT: f64 = 3.0;
const RISK_ADJUSTED_WEIGHT: f64 = 10.0;
const CONSISTENCY_WEIGHT: f64 = 20.0;
const SHARPE_BONUS_WEIGHT: f64 = 10.0;
const ACTIVITY_RATE_PER_DAY: f64 = 0.5;
const ACTIVITY_CAP: f64 = 20.0;
const AUTHORITY_BONUS: f64 = 10.0;

/// Per-component breakdown of a wallet score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub value_score: f64,
    pub pnl_score: f64,
    pub risk_adjusted_score: f64,
    pub consistency_score: f64,
    pub sharpe_bonus: f64,
    pub activity_bonus: f64,
    pub authority_bonus: f64,
    /// Rounded sum of all components
    pub total: i64,
}

pub fn score(
    snapshot: &PortfolioSnapshot,
    joined_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let value_score = (snapshot.total_value + 1.0).log10() * VALUE_WEIGHT;
    let pnl_score = snapshot.pnl_percentage.max(0.0) * PNL_WEIGHT;
    // Negative PnL drags this component below zero on purpose
    let risk_adjusted_score =
        (snapshot.pnl_percentage / snapshot.risk_score.max(1.0)) * RISK_ADJUSTED_WEIGHT;
    let consistency_score = snapshot.win_rate * CONSISTENCY_WEIGHT;
    let sharpe_bonus = (snapshot.sharpe_ratio - 1.0).max(0.0) * SHARPE_BONUS_WEIGHT;

    let days_since_join = (now - joined_at).num_seconds() as f64 / 86_400.0;
    let activity_bonus = (days_since_join * ACTIVITY_RATE_PER_DAY).min(ACTIVITY_CAP);

    let authority_bonus = if snapshot.is_authoritative {
        AUTHORITY_BONUS
    } else {
        0.0
    };

    let total = (value_score
        + pnl_score
        + risk_adjusted_score
        + consistency_score
        + sharpe_bonus
        + activity_bonus
        + authority_bonus)
        .round() as i64;

    ScoreBreakdown {
        value_score,
        pnl_score,
        risk_adjusted_score,
        consistency_score,
        sharpe_bonus,
        activity_bonus,
        authority_bonus,
        total,
    }
}
