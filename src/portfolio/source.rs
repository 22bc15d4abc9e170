/// Vendor-neutral portfolio data interface
///
/// The aggregator talks to upstream data through this trait so refresh
/// behavior can be exercised against scripted sources in tests. Every
/// operation is independently fallible; a failed call degrades the snapshot
/// instead of failing the wallet.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::Address;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("API key not configured")]
    Unconfigured,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(reqwest::StatusCode),

    #[error("No portfolio data available")]
    NoData,
}

/// Position as reported by the vendor, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawPosition {
    pub symbol: String,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl RawPosition {
    pub fn value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Transaction stub; only the timestamp feeds the snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct RawTransaction {
    pub timestamp: Option<DateTime<Utc>>,
}

/// Results of the four vendor calls for one wallet. `None` marks a call
/// that failed or timed out.
#[derive(Debug, Clone, Default)]
pub struct RawBundle {
    /// total_value_usd from the portfolio endpoint
    pub total_value: Option<f64>,
    /// total_pnl_usd from the pnl endpoint
    pub total_pnl: Option<f64>,
    pub positions: Option<Vec<RawPosition>>,
    pub transactions: Option<Vec<RawTransaction>>,
}

#[async_trait]
pub trait PortfolioSource: Send + Sync {
    /// Cheap availability gate; implementations cache the answer
    async fn is_available(&self) -> bool;

    /// Total portfolio value in USD (0 when the vendor reports none)
    async fn portfolio_value(&self, address: &Address) -> Result<f64, SourceError>;

    /// Total PnL in USD (0 when the vendor reports none)
    async fn portfolio_pnl(&self, address: &Address) -> Result<f64, SourceError>;

    async fn positions(&self, address: &Address) -> Result<Vec<RawPosition>, SourceError>;

    async fn recent_transactions(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<RawTransaction>, SourceError>;

    /// Label reported as `dataSource` while this source is available
    fn label(&self) -> &'static str;
}
