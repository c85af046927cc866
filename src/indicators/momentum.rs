// =============================================================================
// Momentum classification from RSI
// =============================================================================
//
//   RSI > bullish_above  => Bullish
//   RSI < bearish_below  => Bearish
//   otherwise            => Neutral
//
// Both comparisons are strict, so the thresholds themselves are Neutral.

use serde::{Deserialize, Serialize};

use crate::types::Momentum;

fn default_bullish_above() -> f64 {
    60.0
}

fn default_bearish_below() -> f64 {
    40.0
}

/// RSI cut-offs for the momentum classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumThresholds {
    #[serde(default = "default_bullish_above")]
    pub bullish_above: f64,
    #[serde(default = "default_bearish_below")]
    pub bearish_below: f64,
}

impl Default for MomentumThresholds {
    fn default() -> Self {
        Self {
            bullish_above: default_bullish_above(),
            bearish_below: default_bearish_below(),
        }
    }
}

/// Classify `rsi` with the standard 60 / 40 thresholds.
pub fn classify_momentum(rsi: f64) -> Momentum {
    classify_momentum_with(rsi, &MomentumThresholds::default())
}

/// Classify `rsi` with caller-supplied thresholds.
pub fn classify_momentum_with(rsi: f64, thresholds: &MomentumThresholds) -> Momentum {
    if rsi > thresholds.bullish_above {
        Momentum::Bullish
    } else if rsi < thresholds.bearish_below {
        Momentum::Bearish
    } else {
        Momentum::Neutral
    }
}
