// =============================================================================
// Refresh Scheduler — owns the timer, invokes the core once per tick
// =============================================================================
//
// A tick is either the refresh interval elapsing or a manual refresh request
// from the API.  Each tick:
//
//   1. Decide market open / closed from exchange-local wall time
//   2. Fetch price, history and (if open) the chain concurrently
//   3. Run the scoring core synchronously
//   4. Publish the result to AppState
//
// The core never sleeps, retries or sees the clock; all of that lives here.
// =============================================================================

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::cycle::{run_cycle, RecommendationOutcome};
use crate::quotes::{fetch_cycle_inputs, QuoteSource};

/// Run one refresh cycle at exchange-local wall time `now` and publish it.
pub async fn refresh_once(state: &AppState, source: &dyn QuoteSource, now: NaiveDateTime) {
    let config = state.effective_config();
    let settings = config.cycle_settings();
    let lookback = config.effective_lookback();
    let market_open = config.market_hours.is_market_open(now);
    let phase = config.market_hours.phase(now);

    if !market_open {
        info!(symbol = %settings.symbol, phase = %phase, "market closed — scanning skipped this cycle");
    }

    let inputs = fetch_cycle_inputs(source, lookback, market_open).await;
    let result = run_cycle(inputs, &settings, market_open);

    if let RecommendationOutcome::Unavailable(reason) = &result.recommendation {
        warn!(symbol = %settings.symbol, source = source.name(), reason = %reason, "cycle produced no recommendation");
        state.push_error(reason.clone());
    }

    state.publish_cycle(result);
}

/// Loop forever: interval ticks plus manual refresh requests.
pub async fn run_refresh_loop(state: Arc<AppState>, source: Arc<dyn QuoteSource>) {
    let period = state.effective_config().refresh_interval();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs = period.as_secs(), source = source.name(), "refresh loop starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = state.refresh_requested.notified() => {
                info!("manual refresh requested");
                interval.reset();
            }
        }

        let now = state.runtime_config.read().market_hours.exchange_time(Utc::now());
        refresh_once(&state, source.as_ref(), now).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::ReplayFixture;
    use crate::runtime_config::{LaunchOverrides, RuntimeConfig};
    use crate::types::OptionType;
    use chrono::NaiveDate;

    fn tuesday(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 17)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn state() -> AppState {
        AppState::new(RuntimeConfig::default(), "unused.json", "replay")
    }

    #[tokio::test]
    async fn demo_fixture_recommends_call_606() {
        let state = state();
        let source = ReplayFixture::demo().unwrap();
        refresh_once(&state, &source, tuesday(10, 0)).await;

        let result = state.latest_cycle().unwrap();
        assert!(result.market_open);
        let rec = match &result.recommendation {
            RecommendationOutcome::Contract(rec) => rec,
            other => panic!("expected a contract, got {other:?}"),
        };
        assert_eq!(rec.scored.contract.option_type, OptionType::Call);
        assert_eq!(rec.scored.contract.strike, 606.0);
        assert_eq!(rec.scored.contract.last_price, 0.82);
        assert!((rec.scored.score - 607.5454545).abs() < 1e-4);
        assert_eq!(result.diagnostics.raw_records, 9);
        assert_eq!(result.diagnostics.normalized, 14);
        assert_eq!(result.diagnostics.malformed, 1);
        assert_eq!(result.diagnostics.eligible, 7);
        assert!(state.recent_errors.read().is_empty());
    }

    #[tokio::test]
    async fn closed_market_publishes_market_closed() {
        let state = state();
        let source = ReplayFixture::demo().unwrap();
        refresh_once(&state, &source, tuesday(18, 0)).await;

        let result = state.latest_cycle().unwrap();
        assert!(!result.market_open);
        assert_eq!(result.recommendation, RecommendationOutcome::MarketClosed);
        assert!(result.indicators.as_option().is_some());
    }

    #[tokio::test]
    async fn outage_is_recorded_as_error() {
        let state = state();
        let source = ReplayFixture {
            current_price: Some(604.15),
            price_history: Some((0..30).map(|i| 600.0 + i as f64 * 0.1).collect()),
            option_chain: None,
            ..ReplayFixture::default()
        };
        refresh_once(&state, &source, tuesday(10, 0)).await;

        let result = state.latest_cycle().unwrap();
        assert!(matches!(result.recommendation, RecommendationOutcome::Unavailable(_)));
        assert_eq!(state.recent_errors.read().len(), 1);
    }

    #[tokio::test]
    async fn launch_symbol_override_reaches_the_cycle() {
        let overrides = LaunchOverrides::from_lookup(|key| (key == "SNIPER_SYMBOL").then(|| "qqq".into()));
        let state = state().with_overrides(overrides);
        let source = ReplayFixture::demo().unwrap();
        refresh_once(&state, &source, tuesday(10, 0)).await;

        assert_eq!(state.latest_cycle().unwrap().symbol, "QQQ");
        assert_eq!(state.runtime_config.read().symbol, "SPY");
    }
}
