// =============================================================================
// Shared types used across the option sniper
// =============================================================================

use serde::{Deserialize, Serialize};

/// Coarse directional classification derived from RSI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Momentum {
    Bullish,
    Bearish,
    Neutral,
}

impl Default for Momentum {
    fn default() -> Self {
        Self::Neutral
    }
}

impl std::fmt::Display for Momentum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Parse the loose spellings providers use ("call", "CALL", "C", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "call" | "c" | "calls" => Some(Self::Call),
            "put" | "p" | "puts" => Some(Self::Put),
            _ => None,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "Call"),
            Self::Put => write!(f, "Put"),
        }
    }
}

/// Which trading window gates the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionKind {
    /// Regular hours only (08:30–15:00 exchange-local).
    Regular,
    /// Regular plus the pre/after-market shoulders (08:00–15:30).
    Extended,
}

impl Default for SessionKind {
    fn default() -> Self {
        Self::Regular
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Regular => write!(f, "Regular"),
            Self::Extended => write!(f, "Extended"),
        }
    }
}
