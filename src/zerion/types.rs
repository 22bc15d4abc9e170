/// Wire format of the Zerion REST API (v1)
///
/// Responses arrive as `{ "data": { "attributes": { ... } } }` envelopes,
/// with list endpoints carrying an array under `data`. Every attribute is
/// optional on the wire; conversion to the raw portfolio types applies the
/// documented defaults.
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::portfolio::{RawPosition, RawTransaction};

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource<A> {
    pub attributes: A,
}

pub type PortfolioResponse = Envelope<Resource<PortfolioAttributes>>;
pub type PnlResponse = Envelope<Resource<PnlAttributes>>;
pub type PositionsResponse = Envelope<Vec<Resource<PositionAttributes>>>;
pub type TransactionsResponse = Envelope<Vec<Resource<TransactionAttributes>>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortfolioAttributes {
    #[serde(default)]
    pub total_value_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PnlAttributes {
    #[serde(default)]
    pub total_pnl_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionAttributes {
    #[serde(default)]
    pub quantity: Option<QuantityField>,
    #[serde(default)]
    pub price: Option<PriceField>,
    #[serde(default)]
    pub fungible_info: Option<FungibleInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuantityField {
    #[serde(default)]
    pub float: Option<f64>,
}

/// The position price arrives either as `{ "value": 1.23 }` or as a bare
/// number, depending on the endpoint version
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Detailed {
        #[serde(default)]
        value: Option<f64>,
    },
    Plain(f64),
}

impl PriceField {
    pub fn usd(&self) -> f64 {
        match self {
            Self::Detailed { value } => value.unwrap_or(0.0),
            Self::Plain(price) => *price,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FungibleInfo {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionAttributes {
    /// Kept as a string so one malformed timestamp cannot sink the batch
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Resource<PositionAttributes> {
    pub fn to_raw(&self) -> RawPosition {
        let quantity = self
            .attributes
            .quantity
            .as_ref()
            .and_then(|q| q.float)
            .unwrap_or(0.0);
        let unit_price = self
            .attributes
            .price
            .as_ref()
            .map(PriceField::usd)
            .unwrap_or(0.0);

        let fungible = self.attributes.fungible_info.as_ref();
        let symbol = fungible
            .and_then(|f| f.symbol.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let name = fungible
            .and_then(|f| f.name.clone())
            .unwrap_or_else(|| symbol.clone());

        RawPosition {
            symbol,
            name,
            quantity,
            unit_price,
        }
    }
}

impl Resource<TransactionAttributes> {
    pub fn to_raw(&self) -> RawTransaction {
        let timestamp: Option<DateTime<Utc>> = self
            .attributes
            .timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));
        RawTransaction { timestamp }
    }
}
