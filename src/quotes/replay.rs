// =============================================================================
// Replay Fixture — canned quotes from a JSON file
// =============================================================================
//
// Fixture layout:
//
//   {
//     "symbol": "SPY",
//     "current_price": 604.15,
//     "price_history": [598.2, ...],
//     "option_chain": [ { "strikePrice": "606", "call": {...}, "put": {...} }, ... ]
//   }
//
// Any of the three inputs may be null or absent to simulate a provider
// outage for that input.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::quotes::{QuoteError, QuoteSource};

const DEMO_FIXTURE: &str = include_str!("../../fixtures/spy_demo.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayFixture {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_history: Option<Vec<f64>>,
    #[serde(default)]
    pub option_chain: Option<Vec<Value>>,
}

impl ReplayFixture {
    /// Load a fixture from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay fixture from {}", path.display()))?;

        let fixture: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse replay fixture from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = ?fixture.symbol,
            chain_records = fixture.option_chain.as_ref().map(Vec::len),
            "replay fixture loaded"
        );

        Ok(fixture)
    }

    /// The bundled SPY demo session.
    pub fn demo() -> Result<Self> {
        serde_json::from_str(DEMO_FIXTURE).context("bundled demo fixture is not valid JSON")
    }
}

#[async_trait]
impl QuoteSource for ReplayFixture {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn fetch_current_price(&self) -> Result<f64, QuoteError> {
        self.current_price
            .ok_or_else(|| QuoteError::Missing("current price".into()))
    }

    async fn fetch_price_history(&self, lookback: usize) -> Result<Vec<f64>, QuoteError> {
        let history = self
            .price_history
            .as_ref()
            .ok_or_else(|| QuoteError::Missing("price history".into()))?;
        let start = history.len().saturating_sub(lookback);
        Ok(history[start..].to_vec())
    }

    async fn fetch_option_chain(&self) -> Result<Vec<Value>, QuoteError> {
        self.option_chain
            .clone()
            .ok_or_else(|| QuoteError::Missing("option chain".into()))
    }
}
