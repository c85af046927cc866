// =============================================================================
// Selector — single best eligible contract
// =============================================================================
//
// Only strictly positive scores are eligible.  Ties go to the contract seen
// first, so the outcome depends only on input order, never on evaluation
// order.

use serde::Serialize;

use crate::scoring::engine::ScoredContract;

/// Outcome of a selection pass.  An empty result is a normal outcome, not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "contract")]
pub enum Selection {
    Best(ScoredContract),
    NoEligibleContract,
}

impl Selection {
    pub fn best(&self) -> Option<&ScoredContract> {
        match self {
            Self::Best(s) => Some(s),
            Self::NoEligibleContract => None,
        }
    }
}

/// Pick the highest-scoring contract with `score > 0`.
pub fn select_best(scored: &[ScoredContract]) -> Selection {
    let mut best: Option<&ScoredContract> = None;

    for candidate in scored.iter().filter(|s| s.score > 0.0) {
        match best {
            Some(current) if candidate.score <= current.score => {}
            _ => best = Some(candidate),
        }
    }

    match best {
        Some(s) => Selection::Best(s.clone()),
        None => Selection::NoEligibleContract,
    }
}
