// =============================================================================
// Support / Resistance and Buy Zone
// =============================================================================
//
// Support and resistance are the rolling low / high of the trailing window.
// The buy zone is a band anchored on support whose offsets come from
// configuration; they are scenario constants, not derived values.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default support/resistance lookback.
pub const DEFAULT_LEVELS_WINDOW: usize = 20;

/// Return `(support, resistance)` = (min, max) of the trailing `window`
/// closes, or of every close when fewer are available.
///
/// Non-finite closes are ignored; a series with no finite value is treated
/// as empty.
pub fn compute_support_resistance(
    closes: &[f64],
    window: usize,
) -> Result<(f64, f64), CoreError> {
    let start = closes.len().saturating_sub(window.max(1));
    let recent = closes[start..].iter().copied().filter(|c| c.is_finite());

    let (support, resistance) = recent.fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), c| (lo.min(c), hi.max(c)),
    );

    if support > resistance {
        return Err(CoreError::InsufficientData {
            needed: 1,
            got: 0,
        });
    }
    Ok((support, resistance))
}

fn default_support_offset_low() -> f64 {
    2.0
}

fn default_support_offset_high() -> f64 {
    6.0
}

/// Offsets above support that bound the buy zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyZoneOffsets {
    #[serde(default = "default_support_offset_low")]
    pub support_offset_low: f64,
    #[serde(default = "default_support_offset_high")]
    pub support_offset_high: f64,
}

impl Default for BuyZoneOffsets {
    fn default() -> Self {
        Self {
            support_offset_low: default_support_offset_low(),
            support_offset_high: default_support_offset_high(),
        }
    }
}

/// Buy zone `(low, high)`; swapped offsets are reordered so `low <= high`.
pub fn compute_buy_zone(support: f64, offsets: &BuyZoneOffsets) -> (f64, f64) {
    let a = support + offsets.support_offset_low;
    let b = support + offsets.support_offset_high;
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_insufficient() {
        assert!(matches!(
            compute_support_resistance(&[], 20),
            Err(CoreError::InsufficientData { .. })
        ));
    }

    #[test]
    fn uses_trailing_window_only() {
        let mut closes = vec![1.0, 1000.0];
        closes.extend((0..20).map(|i| 100.0 + i as f64));
        let (s, r) = compute_support_resistance(&closes, 20).unwrap();
        assert_eq!(s, 100.0);
        assert_eq!(r, 119.0);
    }

    #[test]
    fn short_series_uses_everything() {
        let (s, r) = compute_support_resistance(&[605.0, 601.0, 609.5], 20).unwrap();
        assert_eq!(s, 601.0);
        assert_eq!(r, 609.5);
    }

    #[test]
    fn single_point_support_equals_resistance() {
        let (s, r) = compute_support_resistance(&[42.0], 20).unwrap();
        assert_eq!(s, r);
    }

    #[test]
    fn default_buy_zone_matches_dashboard_levels() {
        assert_eq!(compute_buy_zone(600.0, &BuyZoneOffsets::default()), (602.0, 606.0));
    }

    #[test]
    fn swapped_offsets_are_reordered() {
        let offsets = BuyZoneOffsets {
            support_offset_low: 5.0,
            support_offset_high: 1.0,
        };
        assert_eq!(compute_buy_zone(100.0, &offsets), (101.0, 105.0));
    }
}
