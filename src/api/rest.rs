// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The API is read-mostly: the latest
// cycle result, health, the effective config and the error log, plus a
// manual refresh trigger and the scoring bonus toggles.
//
// CORS is permissive so a local dashboard page can poll it; bind to
// localhost in production.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/cycle", get(latest_cycle))
        .route("/api/v1/refresh", post(refresh))
        .route("/api/v1/config", get(config))
        .route("/api/v1/errors", get(errors))
        .route("/api/v1/scoring-flags", get(get_scoring_flags))
        .route("/api/v1/scoring-flags", post(set_scoring_flags))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    source: &'static str,
    symbol: String,
    state_version: u64,
    cycles_run: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        source: state.source_name,
        symbol: state.effective_config().symbol,
        state_version: state.current_state_version(),
        cycles_run: state.cycles_run.load(Ordering::SeqCst),
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Latest cycle
// =============================================================================

async fn latest_cycle(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.latest_cycle() {
        Some(result) => Json(serde_json::json!({ "cycle": result })).into_response(),
        None => {
            let body = serde_json::json!({ "cycle": null, "message": "No cycle has completed yet" });
            Json(body).into_response()
        }
    }
}

// =============================================================================
// Manual refresh
// =============================================================================

async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.request_refresh();
    info!("refresh requested via API");
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "Refresh scheduled" })),
    )
}

// =============================================================================
// Config & errors
// =============================================================================

/// Effective config for this run (file config plus launch overrides).
async fn config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.effective_config())
}

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}

// =============================================================================
// Scoring flags
// =============================================================================

#[derive(Serialize)]
struct ScoringFlags {
    momentum_bonus: bool,
    level_bonus: bool,
    buy_zone_bonus: bool,
    band_inclusive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    changes: Option<Vec<String>>,
}

fn current_flags(state: &AppState, changes: Option<Vec<String>>) -> ScoringFlags {
    let config = state.runtime_config.read();
    ScoringFlags {
        momentum_bonus: config.scoring.momentum_bonus_enabled,
        level_bonus: config.scoring.level_bonus_enabled,
        buy_zone_bonus: config.scoring.buy_zone_bonus_enabled,
        band_inclusive: config.scoring.band_inclusive,
        changes,
    }
}

async fn get_scoring_flags(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(current_flags(&state, None))
}

#[derive(Deserialize)]
struct ScoringFlagUpdate {
    #[serde(default)]
    momentum_bonus: Option<bool>,
    #[serde(default)]
    level_bonus: Option<bool>,
    #[serde(default)]
    buy_zone_bonus: Option<bool>,
    #[serde(default)]
    band_inclusive: Option<bool>,
}

async fn set_scoring_flags(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ScoringFlagUpdate>,
) -> impl IntoResponse {
    let mut changes = Vec::new();

    {
        let mut config = state.runtime_config.write();

        macro_rules! apply_flag {
            ($update_field:ident, $config_field:ident) => {
                if let Some(val) = update.$update_field {
                    if config.scoring.$config_field != val {
                        changes.push(format!(
                            "{}: {} -> {}",
                            stringify!($update_field),
                            config.scoring.$config_field,
                            val
                        ));
                        config.scoring.$config_field = val;
                    }
                }
            };
        }

        apply_flag!(momentum_bonus, momentum_bonus_enabled);
        apply_flag!(level_bonus, level_bonus_enabled);
        apply_flag!(buy_zone_bonus, buy_zone_bonus_enabled);
        apply_flag!(band_inclusive, band_inclusive);
    }

    if !changes.is_empty() {
        info!(changes = ?changes, "scoring flags updated");

        // Best-effort persistence; the in-memory change already applies.
        if let Err(e) = state.save_config() {
            warn!(error = %e, "failed to save scoring flags to disk");
        }
        state.increment_version();
    }

    Json(current_flags(&state, Some(changes)))
}
