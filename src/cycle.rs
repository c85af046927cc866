// =============================================================================
// Refresh Cycle — one synchronous pass through the scoring core
// =============================================================================
//
// Pipeline:
//   1. Indicators from the price history (or Unavailable)
//   2. Market closed  => MarketClosed, chain is not scored
//   3. Any missing input (price / snapshot / chain) => Unavailable
//   4. Normalize chain, score every contract, select the best
//   5. Attach a target / stop plan to the winner
//
// Inputs arrive already fetched; an upstream failure is passed in as
// `Err(CoreError::UpstreamUnavailable)` and surfaces as `Unavailable` in the
// result.  Nothing here performs I/O or retries.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chain::normalize_chain;
use crate::error::CoreError;
use crate::indicators::{IndicatorParams, IndicatorSnapshot};
use crate::scoring::{score_chain, select_best, ScoredContract, ScoringPolicy, Selection};

// =============================================================================
// Inputs & settings
// =============================================================================

/// Everything fetched for one cycle.  Each field is independently available.
#[derive(Debug, Clone)]
pub struct CycleInputs {
    pub current_price: Result<f64, CoreError>,
    pub price_history: Result<Vec<f64>, CoreError>,
    pub option_chain: Result<Vec<Value>, CoreError>,
}

fn default_target_pct() -> f64 {
    10.0
}

fn default_stop_pct() -> f64 {
    20.0
}

/// Profit target / stop distances applied to the recommended premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradePlanParams {
    #[serde(default = "default_target_pct")]
    pub target_pct: f64,
    #[serde(default = "default_stop_pct")]
    pub stop_pct: f64,
}

impl Default for TradePlanParams {
    fn default() -> Self {
        Self {
            target_pct: default_target_pct(),
            stop_pct: default_stop_pct(),
        }
    }
}

/// Per-cycle settings, cloned out of the runtime config.
#[derive(Debug, Clone, Default)]
pub struct CycleSettings {
    pub symbol: String,
    pub indicators: IndicatorParams,
    pub scoring: ScoringPolicy,
    pub trade_plan: TradePlanParams,
}

// =============================================================================
// Outputs
// =============================================================================

/// A value that the cycle either produced or could not produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value")]
pub enum Availability<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Availability<T> {
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::Available(v) => Some(v),
            Self::Unavailable(_) => None,
        }
    }
}

/// Entry / target / stop in premium terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePlan {
    pub entry: f64,
    pub target: f64,
    pub stop: f64,
}

impl TradePlan {
    pub fn from_premium(premium: f64, params: &TradePlanParams) -> Self {
        Self {
            entry: round_cents(premium),
            target: round_cents(premium * (1.0 + params.target_pct / 100.0)),
            stop: round_cents((premium * (1.0 - params.stop_pct / 100.0)).max(0.0)),
        }
    }
}

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// The cycle's single recommended contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub scored: ScoredContract,
    pub plan: TradePlan,
}

/// What the cycle recommends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value")]
pub enum RecommendationOutcome {
    Contract(Box<Recommendation>),
    NoEligibleContract,
    MarketClosed,
    Unavailable(String),
}

/// Counters for the dashboard's diagnostics panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CycleDiagnostics {
    pub raw_records: usize,
    pub normalized: usize,
    pub malformed: usize,
    pub eligible: usize,
}

/// Result of one refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleResult {
    pub cycle_id: Uuid,
    pub symbol: String,
    pub started_at: DateTime<Utc>,
    pub market_open: bool,
    pub current_price: Availability<f64>,
    pub indicators: Availability<IndicatorSnapshot>,
    pub recommendation: RecommendationOutcome,
    pub diagnostics: CycleDiagnostics,
}

// =============================================================================
// Cycle
// =============================================================================

/// Run the scoring core once.
pub fn run_cycle(inputs: CycleInputs, settings: &CycleSettings, market_open: bool) -> CycleResult {
    let started_at = Utc::now();
    let cycle_id = Uuid::new_v4();

    // ── 1. Current price ────────────────────────────────────────────────
    let current_price = match inputs.current_price {
        Ok(p) if p.is_finite() && p > 0.0 => Availability::Available(p),
        Ok(p) => Availability::Unavailable(format!("invalid current price {p}")),
        Err(e) => Availability::Unavailable(e.to_string()),
    };

    // ── 2. Indicators ───────────────────────────────────────────────────
    let indicators = match inputs
        .price_history
        .and_then(|closes| IndicatorSnapshot::compute(&closes, &settings.indicators))
    {
        Ok(snap) => Availability::Available(snap),
        Err(e) => {
            warn!(symbol = %settings.symbol, error = %e, "indicators unavailable");
            Availability::Unavailable(e.to_string())
        }
    };

    let mut diagnostics = CycleDiagnostics::default();

    // ── 3. Gate + input checks ──────────────────────────────────────────
    let recommendation = if !market_open {
        debug!(symbol = %settings.symbol, "market closed — chain not scored");
        RecommendationOutcome::MarketClosed
    } else {
        match (&current_price, &indicators, inputs.option_chain) {
            (Availability::Unavailable(reason), _, _) => {
                RecommendationOutcome::Unavailable(format!("current price: {reason}"))
            }
            (_, Availability::Unavailable(reason), _) => {
                RecommendationOutcome::Unavailable(format!("indicators: {reason}"))
            }
            (_, _, Err(e)) => {
                warn!(symbol = %settings.symbol, error = %e, "option chain unavailable");
                RecommendationOutcome::Unavailable(format!("option chain: {e}"))
            }
            (Availability::Available(price), Availability::Available(snap), Ok(raw)) => {
                // ── 4. Normalize, score, select ─────────────────────────
                let chain = normalize_chain(&raw);
                let scored = score_chain(&chain.contracts, snap, *price, &settings.scoring);

                diagnostics = CycleDiagnostics {
                    raw_records: chain.raw_records,
                    normalized: chain.contracts.len(),
                    malformed: chain.malformed,
                    eligible: scored.iter().filter(|s| s.score > 0.0).count(),
                };

                // ── 5. Trade plan ───────────────────────────────────────
                match select_best(&scored) {
                    Selection::Best(best) => {
                        let plan = TradePlan::from_premium(best.contract.last_price, &settings.trade_plan);
                        info!(
                            symbol = %settings.symbol,
                            contract = %best.contract.label(),
                            score = best.score,
                            eligible = diagnostics.eligible,
                            "best contract selected"
                        );
                        RecommendationOutcome::Contract(Box::new(Recommendation { scored: best, plan }))
                    }
                    Selection::NoEligibleContract => {
                        info!(
                            symbol = %settings.symbol,
                            normalized = diagnostics.normalized,
                            "no eligible contract this cycle"
                        );
                        RecommendationOutcome::NoEligibleContract
                    }
                }
            }
        }
    };

    CycleResult {
        cycle_id,
        symbol: settings.symbol.clone(),
        started_at,
        market_open,
        current_price,
        indicators,
        recommendation,
        diagnostics,
    }
}
