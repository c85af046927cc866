// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator functions over a chronological close
// series.  Every fallible function returns `Result<_, CoreError>` so callers
// must handle the insufficient-data case explicitly.

pub mod levels;
pub mod momentum;
pub mod rsi;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Momentum;

pub use levels::{compute_buy_zone, compute_support_resistance, BuyZoneOffsets};
pub use momentum::{classify_momentum, classify_momentum_with, MomentumThresholds};
pub use rsi::compute_rsi;

fn default_rsi_period() -> usize {
    rsi::DEFAULT_RSI_PERIOD
}

fn default_levels_window() -> usize {
    levels::DEFAULT_LEVELS_WINDOW
}

/// Lookbacks and offsets used to build an [`IndicatorSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    #[serde(default = "default_levels_window")]
    pub levels_window: usize,
    #[serde(default)]
    pub momentum: MomentumThresholds,
    #[serde(default)]
    pub buy_zone: BuyZoneOffsets,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            levels_window: default_levels_window(),
            momentum: MomentumThresholds::default(),
            buy_zone: BuyZoneOffsets::default(),
        }
    }
}

impl IndicatorParams {
    /// Number of closes needed for every indicator to be available.
    pub fn required_history(&self) -> usize {
        self.rsi_period.saturating_add(1).max(self.levels_window)
    }
}

/// Everything the scoring engine needs to know about the underlying for one
/// refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub momentum: Momentum,
    pub support: f64,
    pub resistance: f64,
    pub buy_zone_low: f64,
    pub buy_zone_high: f64,
}

impl IndicatorSnapshot {
    /// Compute the full snapshot from a close series.
    pub fn compute(closes: &[f64], params: &IndicatorParams) -> Result<Self, CoreError> {
        let rsi = compute_rsi(closes, params.rsi_period)?;
        let momentum = classify_momentum_with(rsi, &params.momentum);
        let (support, resistance) = compute_support_resistance(closes, params.levels_window)?;
        let (buy_zone_low, buy_zone_high) = compute_buy_zone(support, &params.buy_zone);

        Ok(Self {
            rsi,
            momentum,
            support,
            resistance,
            buy_zone_low,
            buy_zone_high,
        })
    }
}
