// =============================================================================
// Live Quote Provider — chart + options REST endpoints
// =============================================================================
//
// Talks to a Yahoo-style quote API:
//
//   GET {base}/v8/finance/chart/{symbol}?range=..&interval=1d
//       chart.result[0].meta.regularMarketPrice
//       chart.result[0].indicators.quote[0].close[]      (nulls on halted days)
//
//   GET {base}/v7/finance/options/{symbol}
//       optionChain.result[0].options[0].calls[] / puts[]
//
// Each call / put is wrapped as `{"call": {...}}` / `{"put": {...}}` so the
// normalizer sees the same nested shape it gets from brokerage chains.
// The raw chain is cached for `chain_cache_secs` to absorb manual refreshes.
// =============================================================================

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::quotes::{QuoteError, QuoteSource};

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_chain_cache_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    concat!("option-sniper/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Connection settings for the live provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 0 disables the chain cache.
    #[serde(default = "default_chain_cache_secs")]
    pub chain_cache_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LiveProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            chain_cache_secs: default_chain_cache_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// HTTP quote client for a single underlying.
pub struct LiveQuoteProvider {
    symbol: String,
    base_url: String,
    client: reqwest::Client,
    chain_ttl: Duration,
    chain_cache: Mutex<Option<(Instant, Vec<Value>)>>,
}

impl LiveQuoteProvider {
    pub fn new(symbol: impl Into<String>, config: &LiveProviderConfig) -> Result<Self, QuoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        let symbol = symbol.into();
        debug!(symbol = %symbol, base_url = %config.base_url, "LiveQuoteProvider initialised");

        Ok(Self {
            symbol,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            chain_ttl: Duration::from_secs(config.chain_cache_secs),
            chain_cache: Mutex::new(None),
        })
    }

    /// GET `path` under the base URL and decode the JSON body.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, QuoteError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuoteError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(resp.json().await?)
    }

    async fn chart(&self, range: &str) -> Result<Value, QuoteError> {
        let path = format!("/v8/finance/chart/{}", self.symbol);
        self.get_json(&path, &[("range", range), ("interval", "1d")]).await
    }

    fn cached_chain(&self) -> Option<Vec<Value>> {
        let cache = self.chain_cache.lock();
        match cache.as_ref() {
            Some((at, chain)) if at.elapsed() < self.chain_ttl => Some(chain.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl QuoteSource for LiveQuoteProvider {
    fn name(&self) -> &'static str {
        "live"
    }

    #[instrument(skip(self), fields(symbol = %self.symbol), name = "quotes::current_price")]
    async fn fetch_current_price(&self) -> Result<f64, QuoteError> {
        let body = self.chart("1d").await?;
        parse_chart_price(&body)
    }

    #[instrument(skip(self), fields(symbol = %self.symbol), name = "quotes::price_history")]
    async fn fetch_price_history(&self, lookback: usize) -> Result<Vec<f64>, QuoteError> {
        let body = self.chart(range_for(lookback)).await?;
        let mut closes = parse_chart_closes(&body)?;
        if closes.len() > lookback {
            closes.drain(..closes.len() - lookback);
        }
        debug!(count = closes.len(), "price history retrieved");
        Ok(closes)
    }

    #[instrument(skip(self), fields(symbol = %self.symbol), name = "quotes::option_chain")]
    async fn fetch_option_chain(&self) -> Result<Vec<Value>, QuoteError> {
        if let Some(chain) = self.cached_chain() {
            debug!(records = chain.len(), "option chain served from cache");
            return Ok(chain);
        }

        let path = format!("/v7/finance/options/{}", self.symbol);
        let body = self.get_json(&path, &[]).await?;
        let chain = flatten_option_chain(&body)?;

        if chain.is_empty() {
            warn!("option chain is empty");
        }
        if !self.chain_ttl.is_zero() {
            *self.chain_cache.lock() = Some((Instant::now(), chain.clone()));
        }
        Ok(chain)
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

/// Chart range wide enough to cover `lookback` trading days.
fn range_for(lookback: usize) -> &'static str {
    match lookback {
        0..=15 => "1mo",
        16..=55 => "3mo",
        56..=115 => "6mo",
        116..=240 => "1y",
        _ => "2y",
    }
}

fn chart_result(body: &Value) -> Result<&Value, QuoteError> {
    if let Some(err) = body.pointer("/chart/error").filter(|e| !e.is_null()) {
        return Err(QuoteError::Api(err.to_string()));
    }
    body.pointer("/chart/result/0")
        .ok_or_else(|| QuoteError::Decode("chart.result[0] missing".into()))
}

fn parse_chart_price(body: &Value) -> Result<f64, QuoteError> {
    chart_result(body)?
        .pointer("/meta/regularMarketPrice")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| QuoteError::Missing("regularMarketPrice".into()))
}

fn parse_chart_closes(body: &Value) -> Result<Vec<f64>, QuoteError> {
    let closes = chart_result(body)?
        .pointer("/indicators/quote/0/close")
        .and_then(Value::as_array)
        .ok_or_else(|| QuoteError::Decode("indicators.quote[0].close missing".into()))?;

    // Halted / partial days come back as null; there are no gaps to fill.
    Ok(closes.iter().filter_map(Value::as_f64).filter(|c| c.is_finite()).collect())
}

fn flatten_option_chain(body: &Value) -> Result<Vec<Value>, QuoteError> {
    if let Some(err) = body.pointer("/optionChain/error").filter(|e| !e.is_null()) {
        return Err(QuoteError::Api(err.to_string()));
    }
    let result = body
        .pointer("/optionChain/result/0")
        .ok_or_else(|| QuoteError::Decode("optionChain.result[0] missing".into()))?;

    let empty = Vec::new();
    let mut records = Vec::new();
    for expiry in result.get("options").and_then(Value::as_array).unwrap_or(&empty) {
        for (side, key) in [("calls", "call"), ("puts", "put")] {
            for contract in expiry.get(side).and_then(Value::as_array).unwrap_or(&empty) {
                let mut wrapped = serde_json::Map::with_capacity(1);
                wrapped.insert(key.to_string(), contract.clone());
                records.push(Value::Object(wrapped));
            }
        }
    }
    Ok(records)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_body() -> Value {
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "SPY", "regularMarketPrice": 604.15 },
                    "indicators": { "quote": [{ "close": [600.1, null, 601.5, 603.0, 604.15] }] }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn price_from_chart_meta() {
        assert_eq!(parse_chart_price(&chart_body()).unwrap(), 604.15);
    }

    #[test]
    fn closes_skip_nulls() {
        assert_eq!(
            parse_chart_closes(&chart_body()).unwrap(),
            vec![600.1, 601.5, 603.0, 604.15]
        );
    }

    #[test]
    fn chart_error_is_api_error() {
        let body = json!({ "chart": { "result": null, "error": { "code": "Not Found" } } });
        assert!(matches!(parse_chart_price(&body), Err(QuoteError::Api(_))));
    }

    #[test]
    fn missing_price_is_missing() {
        let body = json!({ "chart": { "result": [{ "meta": {} }], "error": null } });
        assert!(matches!(parse_chart_price(&body), Err(QuoteError::Missing(_))));
    }

    #[test]
    fn chain_is_flattened_calls_then_puts() {
        let body = json!({
            "optionChain": {
                "result": [{
                    "options": [{
                        "expirationDate": 1750377600,
                        "calls": [{ "strike": 605.0 }, { "strike": 606.0 }],
                        "puts":  [{ "strike": 602.0 }]
                    }]
                }],
                "error": null
            }
        });
        let records = flatten_option_chain(&body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["call"]["strike"], 605.0);
        assert_eq!(records[1]["call"]["strike"], 606.0);
        assert_eq!(records[2]["put"]["strike"], 602.0);
    }

    #[test]
    fn chain_without_result_is_decode_error() {
        let body = json!({ "optionChain": { "result": [], "error": null } });
        assert!(matches!(flatten_option_chain(&body), Err(QuoteError::Decode(_))));
    }

    #[test]
    fn range_covers_lookback() {
        assert_eq!(range_for(15), "1mo");
        assert_eq!(range_for(20), "3mo");
        assert_eq!(range_for(500), "2y");
    }

    #[tokio::test]
    async fn unreachable_host_is_request_error() {
        let config = LiveProviderConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..LiveProviderConfig::default()
        };
        let provider = LiveQuoteProvider::new("SPY", &config).unwrap();
        assert!(matches!(
            provider.fetch_current_price().await,
            Err(QuoteError::Request(_))
        ));
    }

    fn unreachable_provider(chain_cache_secs: u64) -> LiveQuoteProvider {
        let config = LiveProviderConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            chain_cache_secs,
            ..LiveProviderConfig::default()
        };
        LiveQuoteProvider::new("SPY", &config).unwrap()
    }

    #[tokio::test]
    async fn fresh_cached_chain_is_served_without_a_request() {
        let provider = unreachable_provider(60);
        let chain = vec![json!({ "call": { "strike": 606.0 } })];
        *provider.chain_cache.lock() = Some((Instant::now(), chain.clone()));

        assert_eq!(provider.fetch_option_chain().await.unwrap(), chain);
    }

    #[tokio::test]
    async fn expired_cached_chain_is_refetched() {
        let provider = unreachable_provider(1);
        let stale = Instant::now()
            .checked_sub(Duration::from_secs(5))
            .unwrap_or_else(Instant::now);
        *provider.chain_cache.lock() = Some((stale, vec![json!({ "put": {} })]));

        assert!(provider.cached_chain().is_none());
        assert!(matches!(
            provider.fetch_option_chain().await,
            Err(QuoteError::Request(_))
        ));
    }

    #[tokio::test]
    async fn zero_ttl_disables_the_cache() {
        let provider = unreachable_provider(0);
        *provider.chain_cache.lock() = Some((Instant::now(), vec![json!({ "call": {} })]));

        assert!(provider.cached_chain().is_none());
        assert!(matches!(
            provider.fetch_option_chain().await,
            Err(QuoteError::Request(_))
        ));
    }
}
