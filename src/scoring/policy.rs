// =============================================================================
// Scoring Policy — every knob of the contract heuristic in one place
// =============================================================================
//
// All fields carry serde defaults so a partial `scoring` block in the runtime
// config only overrides what it names.  The defaults reproduce the canonical
// heuristic:
//
//   eligibility  IV present, volume > 0, strike in [P+1, P+3] or [P-3, P-1]
//   base         volume/1000 + OI/1000 + (1/IV)*100
//   momentum     +10  (call: RSI < 70, Bullish, P < K+3 | put: RSI > 30, Bearish, P > K-3)
//   levels       +5   (call: P > support | put: P < resistance)
//   buy zone     +5   (low <= P <= high)

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_band_min_offset() -> f64 {
    1.0
}

fn default_band_max_offset() -> f64 {
    3.0
}

fn default_liquidity_divisor() -> f64 {
    1000.0
}

fn default_iv_weight() -> f64 {
    100.0
}

fn default_momentum_bonus() -> f64 {
    10.0
}

fn default_call_rsi_ceiling() -> f64 {
    70.0
}

fn default_put_rsi_floor() -> f64 {
    30.0
}

fn default_strike_slack() -> f64 {
    3.0
}

fn default_level_bonus() -> f64 {
    5.0
}

fn default_buy_zone_bonus() -> f64 {
    5.0
}

/// Named weights, thresholds and toggles for the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    // --- Near-the-money band ------------------------------------------------

    /// Closest allowed distance between strike and current price.
    #[serde(default = "default_band_min_offset")]
    pub band_min_offset: f64,

    /// Farthest allowed distance between strike and current price.
    #[serde(default = "default_band_max_offset")]
    pub band_max_offset: f64,

    /// Whether the band edges themselves are eligible.
    #[serde(default = "default_true")]
    pub band_inclusive: bool,

    // --- Base score ---------------------------------------------------------

    /// Volume and open interest are divided by this before summing.
    #[serde(default = "default_liquidity_divisor")]
    pub liquidity_divisor: f64,

    /// Multiplier on 1 / IV.
    #[serde(default = "default_iv_weight")]
    pub iv_weight: f64,

    // --- Momentum alignment -------------------------------------------------

    #[serde(default = "default_true")]
    pub momentum_bonus_enabled: bool,

    #[serde(default = "default_momentum_bonus")]
    pub momentum_bonus: f64,

    /// Calls only get the momentum bonus below this RSI (not overbought).
    #[serde(default = "default_call_rsi_ceiling")]
    pub call_rsi_ceiling: f64,

    /// Puts only get the momentum bonus above this RSI (not oversold).
    #[serde(default = "default_put_rsi_floor")]
    pub put_rsi_floor: f64,

    /// Price must be within this distance on the near side of the strike.
    #[serde(default = "default_strike_slack")]
    pub strike_slack: f64,

    // --- Support / resistance -----------------------------------------------

    #[serde(default = "default_true")]
    pub level_bonus_enabled: bool,

    #[serde(default = "default_level_bonus")]
    pub level_bonus: f64,

    // --- Buy zone -----------------------------------------------------------

    #[serde(default = "default_true")]
    pub buy_zone_bonus_enabled: bool,

    #[serde(default = "default_buy_zone_bonus")]
    pub buy_zone_bonus: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            band_min_offset: default_band_min_offset(),
            band_max_offset: default_band_max_offset(),
            band_inclusive: true,
            liquidity_divisor: default_liquidity_divisor(),
            iv_weight: default_iv_weight(),
            momentum_bonus_enabled: true,
            momentum_bonus: default_momentum_bonus(),
            call_rsi_ceiling: default_call_rsi_ceiling(),
            put_rsi_floor: default_put_rsi_floor(),
            strike_slack: default_strike_slack(),
            level_bonus_enabled: true,
            level_bonus: default_level_bonus(),
            buy_zone_bonus_enabled: true,
            buy_zone_bonus: default_buy_zone_bonus(),
        }
    }
}

impl ScoringPolicy {
    /// True when `strike` sits in either near-the-money band around `price`.
    pub fn strike_in_band(&self, strike: f64, price: f64) -> bool {
        let within = |lo: f64, hi: f64| {
            if self.band_inclusive {
                lo <= strike && strike <= hi
            } else {
                lo < strike && strike < hi
            }
        };
        within(price + self.band_min_offset, price + self.band_max_offset)
            || within(price - self.band_max_offset, price - self.band_min_offset)
    }
}
