// =============================================================================
// Relative Strength Index (RSI) — simple rolling averages
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split each delta into gain = max(d, 0) and loss = max(-d, 0).
// Step 3 — avg_gain / avg_loss = plain SMA of the trailing `period` gains /
//          losses ending at the most recent close (no Wilder smoothing).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// avg_loss == 0 saturates to 100.0 instead of dividing by zero.
// =============================================================================

use crate::error::CoreError;

/// Default RSI lookback.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the most recent RSI value for `closes`.
///
/// # Edge cases
/// - `period == 0` or `period == usize::MAX` => `InsufficientData`
/// - `closes.len() < period + 1` => `InsufficientData` (need `period` deltas)
/// - average loss of zero (including a perfectly flat window) => 100.0
pub fn compute_rsi(closes: &[f64], period: usize) -> Result<f64, CoreError> {
    let needed = match period.checked_add(1) {
        Some(n) if period > 0 && closes.len() >= n => n,
        _ => {
            return Err(CoreError::InsufficientData {
                needed: period.saturating_add(1),
                got: closes.len(),
            })
        }
    };

    // --- Trailing `period` deltas only ----------------------------------------
    let tail = &closes[closes.len() - needed..];
    let (sum_gain, sum_loss) = tail.windows(2).map(|w| w[1] - w[0]).fold(
        (0.0_f64, 0.0_f64),
        |(g, l), d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        },
    );

    let period_f = period as f64;
    Ok(rsi_from_averages(sum_gain / period_f, sum_loss / period_f))
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(matches!(
            compute_rsi(&[], 14),
            Err(CoreError::InsufficientData { needed: 15, got: 0 })
        ));
    }

    #[test]
    fn rsi_period_zero() {
        assert!(compute_rsi(&[1.0, 2.0, 3.0], 0).is_err());
    }

    #[test]
    fn rsi_huge_period_is_insufficient_not_overflow() {
        assert!(matches!(
            compute_rsi(&[1.0, 2.0, 3.0], usize::MAX),
            Err(CoreError::InsufficientData { needed: usize::MAX, got: 3 })
        ));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(matches!(
            compute_rsi(&closes, 14),
            Err(CoreError::InsufficientData { needed: 15, got: 14 })
        ));
    }

    #[test]
    fn rsi_fifteen_increasing_points_saturates_to_100() {
        let closes: Vec<f64> = (100..=114).map(|x| x as f64).collect();
        assert_eq!(closes.len(), 15);
        let rsi = compute_rsi(&closes, 14).unwrap();
        assert!((rsi - 100.0).abs() < 1e-10, "expected 100.0, got {rsi}");
    }

    #[test]
    fn rsi_all_gains_any_length() {
        for len in 15..60 {
            let closes: Vec<f64> = (0..len).map(|x| 10.0 + x as f64 * 0.5).collect();
            let rsi = compute_rsi(&closes, 14).unwrap();
            assert!(rsi.is_finite());
            assert!((rsi - 100.0).abs() < 1e-10, "len {len}: got {rsi}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        for len in 15..60 {
            let closes: Vec<f64> = (0..len).rev().map(|x| 10.0 + x as f64).collect();
            let rsi = compute_rsi(&closes, 14).unwrap();
            assert!(rsi.abs() < 1e-10, "len {len}: expected 0.0, got {rsi}");
        }
    }

    #[test]
    fn rsi_flat_window_saturates() {
        let closes = vec![100.0; 30];
        assert_eq!(compute_rsi(&closes, 14).unwrap(), 100.0);
    }

    #[test]
    fn rsi_balanced_moves_is_fifty() {
        let rsi = compute_rsi(&[10.0, 11.0, 10.0], 2).unwrap();
        assert!((rsi - 50.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_only_uses_trailing_window() {
        // The early crash falls outside the 2-delta window.
        let rsi = compute_rsi(&[50.0, 10.0, 11.0, 12.0], 2).unwrap();
        assert!((rsi - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_known_value() {
        // gains: 2, 0, 1 ; losses: 0, 1, 0 => RS = 3 / 1 => RSI = 75
        let rsi = compute_rsi(&[10.0, 12.0, 11.0, 12.0], 3).unwrap();
        assert!((rsi - 75.0).abs() < 1e-10, "got {rsi}");
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let rsi = compute_rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&rsi), "RSI {rsi} out of range");
    }
}
