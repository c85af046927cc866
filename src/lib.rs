// =============================================================================
// Option Sniper — library root
// =============================================================================
//
// The scoring core (indicators, chain normalizer, scoring engine, selector,
// refresh cycle) plus the service shell around it (quote sources, market
// hours, scheduler, state, REST API).  `main.rs` only wires these together.
// =============================================================================

// Core
pub mod chain;
pub mod cycle;
pub mod error;
pub mod indicators;
pub mod scoring;
pub mod types;

// Service shell
pub mod api;
pub mod app_state;
pub mod market_hours;
pub mod quotes;
pub mod runtime_config;
pub mod scheduler;

// Re-export commonly used types
pub use chain::{normalize_chain, OptionContract};
pub use cycle::{run_cycle, CycleInputs, CycleResult, CycleSettings, RecommendationOutcome};
pub use error::CoreError;
pub use indicators::{IndicatorParams, IndicatorSnapshot};
pub use market_hours::{is_market_open, MarketHours};
pub use scoring::{score, select_best, ScoredContract, ScoringPolicy, Selection};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn core_entry_points_compose_from_the_crate_root() {
        let closes: Vec<f64> = (0..20).map(|i| 598.0 + i as f64 * 0.3).collect();
        let snapshot = IndicatorSnapshot::compute(&closes, &IndicatorParams::default()).unwrap();

        let raw = vec![
            json!({ "type": "Call", "strike": 606, "volume": 1000, "openInterest": 2000,
                    "impliedVolatility": 0.25, "lastPrice": 0.8 }),
            json!({ "type": "Call", "strike": 620, "volume": 9000, "openInterest": 9000,
                    "impliedVolatility": 0.25 }),
        ];
        let chain = normalize_chain(&raw);
        let policy = ScoringPolicy::default();
        let scored: Vec<ScoredContract> = chain
            .contracts
            .iter()
            .map(|c| ScoredContract {
                contract: c.clone(),
                score: score(c, &snapshot, 604.0, &policy),
                breakdown: scoring::score_breakdown(c, &snapshot, 604.0, &policy),
                current_price: 604.0,
                snapshot,
            })
            .collect();
        assert_eq!(scored[1].score, scoring::DISQUALIFIED);

        let best = select_best(&scored);
        assert_eq!(best.best().map(|s| s.contract.strike), Some(606.0));

        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 17)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        assert!(is_market_open(tuesday, &MarketHours::default()));
    }
}
