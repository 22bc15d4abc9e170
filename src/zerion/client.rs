/// Zerion REST client with Basic authentication and a cached key probe
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::{header, Client, RequestBuilder};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ZerionConfig;
use crate::core::Address;
use crate::portfolio::{PortfolioSource, RawPosition, RawTransaction, SourceError};

use super::types::{
    PnlResponse, PortfolioResponse, PositionsResponse, TransactionsResponse,
};

const SOURCE_LABEL: &str = "zerion-api";

/// Positions are limited to mainnet holdings
const POSITIONS_CHAIN_FILTER: &str = "ethereum";

#[derive(Debug)]
struct KeyState {
    valid: bool,
    checked_at: Option<Instant>,
}

/// HTTP client for the Zerion wallet endpoints.
///
/// A lightweight `/chains` probe decides whether the key works; the answer
/// is cached so the refresh loop does not hammer the endpoint. Without a
/// configured key the client reports itself permanently unavailable and the
/// arena runs on synthetic data.
pub struct ZerionClient {
    http: Client,
    base: String,
    configured: bool,
    check_interval: Duration,
    key_state: RwLock<KeyState>,
}

impl ZerionClient {
    pub fn new(config: &ZerionConfig) -> anyhow::Result<Self> {
        // Parse up front so a bad endpoint fails at startup, not mid-cycle
        let base = Url::parse(&config.api_base)?;
        let base = base.as_str().trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let configured = match config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {
                let encoded = BASE64.encode(format!("{key}:"));
                let mut auth = header::HeaderValue::from_str(&format!("Basic {encoded}"))?;
                auth.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, auth);
                true
            }
            _ => false,
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base,
            configured,
            check_interval: Duration::from_secs(config.key_check_interval_secs),
            key_state: RwLock::new(KeyState {
                valid: false,
                checked_at: None,
            }),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Probe `/chains` to learn whether the key works, caching the answer
    /// for the configured interval
    async fn check_key(&self) -> bool {
        if !self.configured {
            return false;
        }

        {
            let state = self.key_state.read().await;
            if let Some(at) = state.checked_at {
                if at.elapsed() < self.check_interval {
                    return state.valid;
                }
            }
        }

        let mut state = self.key_state.write().await;
        // Another task may have probed while we waited for the write lock
        if let Some(at) = state.checked_at {
            if at.elapsed() < self.check_interval {
                return state.valid;
            }
        }

        let was_valid = state.valid;
        let valid = match self.http.get(format!("{}/chains", self.base)).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                // 401 just means the key is not (yet) activated
                if response.status() != reqwest::StatusCode::UNAUTHORIZED {
                    warn!(status = %response.status(), "⚠️ Zerion API check failed");
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "⚠️ Zerion API check failed");
                false
            }
        };

        state.valid = valid;
        state.checked_at = Some(Instant::now());

        if valid && !was_valid {
            info!("✅ Zerion API key is active, switching to live data");
        } else if !valid && was_valid {
            warn!("⚠️ Zerion API key no longer valid, switching to synthetic data");
        }

        valid
    }

    fn wallet_endpoint(&self, address: &Address, suffix: &str) -> String {
        format!("{}/wallets/{}/{}", self.base, address, suffix)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SourceError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PortfolioSource for ZerionClient {
    async fn is_available(&self) -> bool {
        self.check_key().await
    }

    async fn portfolio_value(&self, address: &Address) -> Result<f64, SourceError> {
        if !self.configured {
            return Err(SourceError::Unconfigured);
        }
        let url = self.wallet_endpoint(address, "portfolio");
        let body: PortfolioResponse = self.send(self.http.get(url)).await?;
        let total = body.data.attributes.total_value_usd.unwrap_or(0.0);
        debug!(address = %address, total_value = total, "Fetched portfolio totals");
        Ok(total)
    }

    async fn portfolio_pnl(&self, address: &Address) -> Result<f64, SourceError> {
        if !self.configured {
            return Err(SourceError::Unconfigured);
        }
        let url = self.wallet_endpoint(address, "pnl");
        let body: PnlResponse = self.send(self.http.get(url)).await?;
        Ok(body.data.attributes.total_pnl_usd.unwrap_or(0.0))
    }

    async fn positions(&self, address: &Address) -> Result<Vec<RawPosition>, SourceError> {
        if !self.configured {
            return Err(SourceError::Unconfigured);
        }
        let url = self.wallet_endpoint(address, "positions");
        let request = self
            .http
            .get(url)
            .query(&[("filter[chain_ids]", POSITIONS_CHAIN_FILTER)]);
        let body: PositionsResponse = self.send(request).await?;
        Ok(body.data.iter().map(|position| position.to_raw()).collect())
    }

    async fn recent_transactions(
        &self,
        address: &Address,
        limit: usize,
    ) -> Result<Vec<RawTransaction>, SourceError> {
        if !self.configured {
            return Err(SourceError::Unconfigured);
        }
        let url = self.wallet_endpoint(address, "transactions");
        let request = self.http.get(url).query(&[("limit", limit)]);
        let body: TransactionsResponse = self.send(request).await?;
        Ok(body.data.iter().map(|tx| tx.to_raw()).collect())
    }

    fn label(&self) -> &'static str {
        SOURCE_LABEL
    }
}
