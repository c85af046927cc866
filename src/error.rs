// =============================================================================
// Core error taxonomy
// =============================================================================
//
// Every failure the scoring core can see is recoverable at the cycle
// boundary.  These variants are turned into `Unavailable` outcomes in the
// `CycleResult`; none of them is allowed to escape as a panic.
//
// An empty selection is NOT an error: see `scoring::Selection`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Price history shorter than the indicator window requires.
    #[error("insufficient data: need {needed} prices, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A raw chain entry that cannot be normalized even leniently.
    #[error("malformed contract: {0}")]
    MalformedContract(String),

    /// The data-fetch collaborator failed to deliver an input.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_both_counts() {
        let err = CoreError::InsufficientData { needed: 15, got: 3 };
        assert_eq!(err.to_string(), "insufficient data: need 15 prices, got 3");
    }
}
