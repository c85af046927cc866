// =============================================================================
// Central Application State
// =============================================================================
//
// Ties the runtime config, the latest cycle result and the error log
// together for the scheduler and the REST API.
//
// `runtime_config` is the file config and is what gets saved.  Launch
// overrides live beside it and are folded in by `effective_config()`.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values.
//   - tokio Notify for manual refresh requests.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Notify;

use crate::cycle::CycleResult;
use crate::runtime_config::{LaunchOverrides, RuntimeConfig};

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every published cycle or recorded error.
    pub state_version: AtomicU64,
    pub cycles_run: AtomicU64,

    pub runtime_config: Arc<RwLock<RuntimeConfig>>,
    /// Env overrides for this run; never persisted.
    pub launch_overrides: LaunchOverrides,
    /// Where config changes are persisted.
    pub config_path: PathBuf,
    /// Name of the active quote source.
    pub source_name: &'static str,

    pub latest_cycle: RwLock<Option<CycleResult>>,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Wakes the scheduler for an immediate cycle.
    pub refresh_requested: Notify,

    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, config_path: impl Into<PathBuf>, source_name: &'static str) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            cycles_run: AtomicU64::new(0),
            runtime_config: Arc::new(RwLock::new(config)),
            launch_overrides: LaunchOverrides::default(),
            config_path: config_path.into(),
            source_name,
            latest_cycle: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            refresh_requested: Notify::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_overrides(mut self, overrides: LaunchOverrides) -> Self {
        self.launch_overrides = overrides;
        self
    }

    // ── Config ──────────────────────────────────────────────────────────

    /// File config with this run's launch overrides applied.
    pub fn effective_config(&self) -> RuntimeConfig {
        self.launch_overrides.apply(&self.runtime_config.read())
    }

    /// Persist the file config (overrides excluded) to `config_path`.
    pub fn save_config(&self) -> anyhow::Result<()> {
        let config = self.runtime_config.read().clone();
        config.save(&self.config_path)
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Cycles ──────────────────────────────────────────────────────────

    /// Replace the latest cycle result.  Results are never accumulated.
    pub fn publish_cycle(&self, result: CycleResult) {
        *self.latest_cycle.write() = Some(result);
        self.cycles_run.fetch_add(1, Ordering::SeqCst);
        self.increment_version();
    }

    pub fn latest_cycle(&self) -> Option<CycleResult> {
        self.latest_cycle.read().clone()
    }

    /// Ask the scheduler to run a cycle now.
    pub fn request_refresh(&self) {
        self.refresh_requested.notify_one();
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message.  The log is capped at [`MAX_RECENT_ERRORS`];
    /// oldest entries are evicted first.
    pub fn push_error(&self, message: String) {
        let record = ErrorRecord {
            message,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }
}
