// =============================================================================
// Normalized option contract
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::OptionType;

/// One call or put after normalization.  Numeric fields are never negative;
/// `implied_volatility` is `None` when the provider did not supply a usable
/// (strictly positive) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub option_type: OptionType,
    pub strike: f64,
    pub last_price: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: Option<f64>,
    pub expiration_date: Option<NaiveDate>,
}

impl OptionContract {
    /// Compact label for log lines, e.g. `Call 606 2025-06-20`.
    pub fn label(&self) -> String {
        match self.expiration_date {
            Some(exp) => format!("{} {} {}", self.option_type, self.strike, exp),
            None => format!("{} {}", self.option_type, self.strike),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_expiration_when_known() {
        let c = OptionContract {
            option_type: OptionType::Call,
            strike: 606.0,
            last_price: 1.2,
            volume: 10,
            open_interest: 10,
            implied_volatility: Some(0.2),
            expiration_date: NaiveDate::from_ymd_opt(2025, 6, 20),
        };
        assert_eq!(c.label(), "Call 606 2025-06-20");

        let undated = OptionContract {
            expiration_date: None,
            ..c
        };
        assert_eq!(undated.label(), "Call 606");
    }
}
