// =============================================================================
// Scoring Module
// =============================================================================
//
// Contract scoring pipeline:
// - Policy: named weights / thresholds / toggles
// - Engine: per-contract score with term breakdown
// - Selector: argmax with first-seen tie-break

pub mod engine;
pub mod policy;
pub mod selector;

pub use engine::{score, score_breakdown, score_chain, ScoreBreakdown, ScoredContract, DISQUALIFIED};
pub use policy::ScoringPolicy;
pub use selector::{select_best, Selection};
