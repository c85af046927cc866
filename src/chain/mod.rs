// =============================================================================
// Option Chain Module
// =============================================================================
//
// Uniform contract record plus the lenient normalizer that builds it from
// whatever the quote provider returned.

pub mod contract;
pub mod normalizer;

pub use contract::OptionContract;
pub use normalizer::{normalize_chain, normalize_entry, NormalizedChain};
