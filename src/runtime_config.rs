// =============================================================================
// Runtime Configuration — scanner settings with atomic save
// =============================================================================
//
// Every tunable parameter of the sniper lives here: the underlying, refresh
// cadence, data source, market hours, indicator windows, the scoring policy
// and the trade plan percentages.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cycle::{CycleSettings, TradePlanParams};
use crate::indicators::IndicatorParams;
use crate::market_hours::MarketHours;
use crate::quotes::LiveProviderConfig;
use crate::scoring::ScoringPolicy;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "SPY".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    60
}

fn default_history_lookback() -> usize {
    30
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

// =============================================================================
// DataSourceKind
// =============================================================================

/// Where quotes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceKind {
    /// HTTP quote provider.
    Live,
    /// JSON fixture (`fixture_path`, or the bundled demo session).
    Replay,
}

impl Default for DataSourceKind {
    fn default() -> Self {
        Self::Live
    }
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "Live"),
            Self::Replay => write!(f, "Replay"),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Underlying & cadence ------------------------------------------------

    /// The single underlying the scanner watches.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Seconds between automatic refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Daily closes requested per cycle.
    #[serde(default = "default_history_lookback")]
    pub history_lookback: usize,

    // --- Data source ---------------------------------------------------------

    #[serde(default)]
    pub data_source: DataSourceKind,

    /// Fixture used when `data_source` is `Replay`; `None` => bundled demo.
    #[serde(default)]
    pub fixture_path: Option<String>,

    #[serde(default)]
    pub live: LiveProviderConfig,

    // --- Gating & analysis ---------------------------------------------------

    #[serde(default)]
    pub market_hours: MarketHours,

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub scoring: ScoringPolicy,

    #[serde(default)]
    pub trade_plan: TradePlanParams,

    // --- API -----------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            refresh_interval_secs: default_refresh_interval_secs(),
            history_lookback: default_history_lookback(),
            data_source: DataSourceKind::Live,
            fixture_path: None,
            live: LiveProviderConfig::default(),
            market_hours: MarketHours::default(),
            indicators: IndicatorParams::default(),
            scoring: ScoringPolicy::default(),
            trade_plan: TradePlanParams::default(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            data_source = %config.data_source,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// History length actually requested: never shorter than the indicators
    /// need.
    pub fn effective_lookback(&self) -> usize {
        let required = self.indicators.required_history();
        if self.history_lookback < required {
            warn!(
                configured = self.history_lookback,
                required, "history_lookback too short for indicator windows — raising"
            );
            required
        } else {
            self.history_lookback
        }
    }

    /// Refresh interval, floored at one second.
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    /// Settings handed to each `run_cycle` call.
    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            symbol: self.symbol.clone(),
            indicators: self.indicators,
            scoring: self.scoring.clone(),
            trade_plan: self.trade_plan,
        }
    }
}

// =============================================================================
// LaunchOverrides
// =============================================================================

/// One-off overrides taken from the process environment.
///
/// They apply on top of the file config for this run only and are never
/// written back: saving always serialises the file config.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchOverrides {
    /// `SNIPER_SYMBOL`
    pub symbol: Option<String>,
    /// `SNIPER_BIND_ADDR`
    pub bind_addr: Option<String>,
    /// `SNIPER_FIXTURE`; forces the replay source.
    pub fixture_path: Option<String>,
}

impl LaunchOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            symbol: non_blank("SNIPER_SYMBOL").map(|s| s.to_uppercase()),
            bind_addr: non_blank("SNIPER_BIND_ADDR"),
            fixture_path: non_blank("SNIPER_FIXTURE"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.bind_addr.is_none() && self.fixture_path.is_none()
    }

    /// The config this run actually uses.
    pub fn apply(&self, base: &RuntimeConfig) -> RuntimeConfig {
        let mut config = base.clone();
        if let Some(symbol) = &self.symbol {
            config.symbol = symbol.clone();
        }
        if let Some(addr) = &self.bind_addr {
            config.bind_addr = addr.clone();
        }
        if let Some(path) = &self.fixture_path {
            config.data_source = DataSourceKind::Replay;
            config.fixture_path = Some(path.clone());
        }
        config
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionKind;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.symbol, "SPY");
        assert_eq!(cfg.refresh_interval_secs, 60);
        assert_eq!(cfg.data_source, DataSourceKind::Live);
        assert_eq!(cfg.market_hours.session, SessionKind::Regular);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.indicators.levels_window, 20);
        assert!(cfg.scoring.momentum_bonus_enabled);
        assert!((cfg.trade_plan.target_pct - 10.0).abs() < f64::EPSILON);
        assert!((cfg.trade_plan.stop_pct - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.symbol, "SPY");
        assert_eq!(cfg.bind_addr, "127.0.0.1:3001");
        assert_eq!(cfg.scoring, ScoringPolicy::default());
        assert!(cfg.fixture_path.is_none());
    }

    #[test]
    fn deserialise_partial_nested_json_fills_defaults() {
        let json = r#"{
            "data_source": "Replay",
            "market_hours": { "session": "Extended" },
            "scoring": { "band_inclusive": false },
            "indicators": { "buy_zone": { "support_offset_high": 8.0 } }
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.data_source, DataSourceKind::Replay);
        assert_eq!(cfg.market_hours.session, SessionKind::Extended);
        assert!(!cfg.scoring.band_inclusive);
        assert!(cfg.scoring.buy_zone_bonus_enabled);
        assert_eq!(cfg.indicators.buy_zone.support_offset_high, 8.0);
        assert_eq!(cfg.indicators.buy_zone.support_offset_low, 2.0);
        assert_eq!(cfg.indicators.rsi_period, 14);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("option_sniper.json");

        let mut cfg = RuntimeConfig::default();
        cfg.symbol = "QQQ".into();
        cfg.scoring.buy_zone_bonus_enabled = false;
        cfg.save(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.symbol, "QQQ");
        assert!(!loaded.scoring.buy_zone_bonus_enabled);
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(RuntimeConfig::load("/nonexistent/option_sniper.json").is_err());
    }

    #[test]
    fn lookback_is_raised_to_indicator_requirement() {
        let mut cfg = RuntimeConfig::default();
        cfg.history_lookback = 5;
        assert_eq!(cfg.effective_lookback(), 20);
        cfg.history_lookback = 90;
        assert_eq!(cfg.effective_lookback(), 90);
    }

    #[test]
    fn launch_overrides_from_lookup() {
        let overrides = LaunchOverrides::from_lookup(|key| match key {
            "SNIPER_SYMBOL" => Some(" qqq ".into()),
            "SNIPER_BIND_ADDR" => Some("   ".into()),
            "SNIPER_FIXTURE" => Some("fixtures/spy_demo.json".into()),
            _ => None,
        });
        assert_eq!(overrides.symbol.as_deref(), Some("QQQ"));
        assert!(overrides.bind_addr.is_none());
        assert!(!overrides.is_empty());

        let base = RuntimeConfig::default();
        let effective = overrides.apply(&base);
        assert_eq!(effective.symbol, "QQQ");
        assert_eq!(effective.bind_addr, base.bind_addr);
        assert_eq!(effective.data_source, DataSourceKind::Replay);
        assert_eq!(effective.fixture_path.as_deref(), Some("fixtures/spy_demo.json"));
        // The base is untouched.
        assert_eq!(base.data_source, DataSourceKind::Live);
    }

    #[test]
    fn empty_overrides_leave_config_unchanged() {
        let overrides = LaunchOverrides::from_lookup(|_| None);
        assert!(overrides.is_empty());
        let base = RuntimeConfig::default();
        let effective = overrides.apply(&base);
        assert_eq!(effective.symbol, base.symbol);
        assert_eq!(effective.data_source, base.data_source);
        assert_eq!(effective.fixture_path, base.fixture_path);
    }

    #[test]
    fn refresh_interval_floor() {
        let mut cfg = RuntimeConfig::default();
        cfg.refresh_interval_secs = 0;
        assert_eq!(cfg.refresh_interval(), std::time::Duration::from_secs(1));
    }
}
