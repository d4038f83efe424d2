//! Best-effort market data lookup. Anything that fails here degrades to
//! "no logo / price unknown", it never fails a flow.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMarketData {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub logo: String,
}

#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Market data per lowercase symbol. Missing symbols are simply absent.
    async fn fetch(&self, symbols: &[String]) -> HashMap<String, TokenMarketData>;
}

/// Oracle backed by the portal CDN price endpoint.
pub struct HttpPriceOracle {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPriceOracle {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn fetch(&self, symbols: &[String]) -> HashMap<String, TokenMarketData> {
        if symbols.is_empty() {
            return HashMap::new();
        }
        let url = format!(
            "{}/api/v1/token-data?symbols={}",
            self.base_url,
            symbols.join(",")
        );
        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("price lookup failed: {err}");
                return HashMap::new();
            }
        };
        match response.json().await {
            Ok(data) => data,
            Err(err) => {
                warn!("price lookup returned unreadable data: {err}");
                HashMap::new()
            }
        }
    }
}

/// Oracle that knows nothing, for tests and offline tools.
pub struct NoopPriceOracle;

#[async_trait]
impl PriceOracle for NoopPriceOracle {
    async fn fetch(&self, _symbols: &[String]) -> HashMap<String, TokenMarketData> {
        HashMap::new()
    }
}
