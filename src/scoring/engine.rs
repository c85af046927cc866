// =============================================================================
// Scoring Engine — desirability of one contract against the snapshot
// =============================================================================
//
// Total and pure: a contract that fails eligibility gets the sentinel score
// `DISQUALIFIED` (-1.0) and collects no bonuses.  The breakdown keeps each
// term separately so the dashboard can show why a contract won.

use serde::Serialize;

use crate::chain::OptionContract;
use crate::indicators::IndicatorSnapshot;
use crate::scoring::policy::ScoringPolicy;
use crate::types::{Momentum, OptionType};

/// Sentinel score for ineligible contracts.
pub const DISQUALIFIED: f64 = -1.0;

/// Why a contract was ruled out before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Disqualification {
    MissingImpliedVolatility,
    NoVolume,
    OutsideBand,
}

/// The individual terms of a contract's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub momentum_bonus: f64,
    pub level_bonus: f64,
    pub buy_zone_bonus: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disqualified: Option<Disqualification>,
}

impl ScoreBreakdown {
    fn disqualified(reason: Disqualification) -> Self {
        Self {
            base: 0.0,
            momentum_bonus: 0.0,
            level_bonus: 0.0,
            buy_zone_bonus: 0.0,
            disqualified: Some(reason),
        }
    }

    pub fn total(&self) -> f64 {
        if self.disqualified.is_some() {
            return DISQUALIFIED;
        }
        self.base + self.momentum_bonus + self.level_bonus + self.buy_zone_bonus
    }
}

/// A contract together with the score and the inputs it was scored against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredContract {
    pub contract: OptionContract,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub current_price: f64,
    pub snapshot: IndicatorSnapshot,
}

/// Score a single contract.
pub fn score(
    contract: &OptionContract,
    snapshot: &IndicatorSnapshot,
    current_price: f64,
    policy: &ScoringPolicy,
) -> f64 {
    score_breakdown(contract, snapshot, current_price, policy).total()
}

/// Score a single contract, keeping every term.
pub fn score_breakdown(
    contract: &OptionContract,
    snapshot: &IndicatorSnapshot,
    current_price: f64,
    policy: &ScoringPolicy,
) -> ScoreBreakdown {
    // ── 1. Data eligibility ─────────────────────────────────────────────
    let iv = match contract.implied_volatility {
        Some(iv) if iv > 0.0 => iv,
        _ => return ScoreBreakdown::disqualified(Disqualification::MissingImpliedVolatility),
    };
    if contract.volume == 0 {
        return ScoreBreakdown::disqualified(Disqualification::NoVolume);
    }

    // ── 2. Near-the-money band ──────────────────────────────────────────
    if !policy.strike_in_band(contract.strike, current_price) {
        return ScoreBreakdown::disqualified(Disqualification::OutsideBand);
    }

    // ── 3. Liquidity + volatility cheapness ─────────────────────────────
    let base = contract.volume as f64 / policy.liquidity_divisor
        + contract.open_interest as f64 / policy.liquidity_divisor
        + (1.0 / iv) * policy.iv_weight;

    // ── 4. Momentum alignment ───────────────────────────────────────────
    let aligned = match contract.option_type {
        OptionType::Call => {
            snapshot.rsi < policy.call_rsi_ceiling
                && snapshot.momentum == Momentum::Bullish
                && current_price < contract.strike + policy.strike_slack
        }
        OptionType::Put => {
            snapshot.rsi > policy.put_rsi_floor
                && snapshot.momentum == Momentum::Bearish
                && current_price > contract.strike - policy.strike_slack
        }
    };
    let momentum_bonus = if policy.momentum_bonus_enabled && aligned {
        policy.momentum_bonus
    } else {
        0.0
    };

    // ── 5. Support / resistance ─────────────────────────────────────────
    let level_ok = match contract.option_type {
        OptionType::Call => current_price > snapshot.support,
        OptionType::Put => current_price < snapshot.resistance,
    };
    let level_bonus = if policy.level_bonus_enabled && level_ok {
        policy.level_bonus
    } else {
        0.0
    };

    // ── 6. Buy zone ─────────────────────────────────────────────────────
    let in_zone = snapshot.buy_zone_low <= current_price && current_price <= snapshot.buy_zone_high;
    let buy_zone_bonus = if policy.buy_zone_bonus_enabled && in_zone {
        policy.buy_zone_bonus
    } else {
        0.0
    };

    ScoreBreakdown {
        base,
        momentum_bonus,
        level_bonus,
        buy_zone_bonus,
        disqualified: None,
    }
}

/// Score every contract, preserving input order.
pub fn score_chain(
    contracts: &[OptionContract],
    snapshot: &IndicatorSnapshot,
    current_price: f64,
    policy: &ScoringPolicy,
) -> Vec<ScoredContract> {
    contracts
        .iter()
        .map(|c| {
            let breakdown = score_breakdown(c, snapshot, current_price, policy);
            ScoredContract {
                contract: c.clone(),
                score: breakdown.total(),
                breakdown,
                current_price,
                snapshot: *snapshot,
            }
        })
        .collect()
}
