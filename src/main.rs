// =============================================================================
// Option Sniper — Main Entry Point
// =============================================================================
//
// Watches one underlying, refreshes quotes on a fixed cadence during market
// hours and publishes the single best-scored option contract over a small
// REST API.  Recommendations are advisory only; nothing is ever ordered.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use option_sniper::api;
use option_sniper::app_state::AppState;
use option_sniper::quotes::{LiveQuoteProvider, QuoteSource, ReplayFixture};
use option_sniper::runtime_config::{DataSourceKind, LaunchOverrides, RuntimeConfig};
use option_sniper::scheduler;

const CONFIG_PATH: &str = "option_sniper.json";

/// Build the quote source selected by the config.
fn build_source(config: &RuntimeConfig) -> anyhow::Result<Arc<dyn QuoteSource>> {
    match config.data_source {
        DataSourceKind::Live => {
            let provider = LiveQuoteProvider::new(config.symbol.clone(), &config.live)
                .context("failed to build live quote provider")?;
            Ok(Arc::new(provider))
        }
        DataSourceKind::Replay => {
            let fixture = match &config.fixture_path {
                Some(path) => ReplayFixture::load(path)?,
                None => {
                    info!("no fixture_path configured — replaying bundled demo session");
                    ReplayFixture::demo()?
                }
            };
            if let Some(sym) = &fixture.symbol {
                if !sym.eq_ignore_ascii_case(&config.symbol) {
                    warn!(fixture = %sym, configured = %config.symbol, "fixture symbol differs from configured symbol");
                }
            }
            Ok(Arc::new(fixture))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Option Sniper — Starting Up                       ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config = RuntimeConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    // Env overrides apply to this run only; the file config is what gets saved.
    let overrides = LaunchOverrides::from_env();
    if !overrides.is_empty() {
        info!(overrides = ?overrides, "Launch overrides active (not persisted)");
    }
    let effective = overrides.apply(&config);

    info!(
        symbol = %effective.symbol,
        data_source = %effective.data_source,
        session = %effective.market_hours.session,
        refresh_secs = effective.refresh_interval_secs,
        "Configured underlying"
    );

    // ── 2. Quote source & shared state ───────────────────────────────────
    let source = build_source(&effective)?;
    let bind_addr = effective.bind_addr.clone();
    let state = Arc::new(AppState::new(config, CONFIG_PATH, source.name()).with_overrides(overrides));

    // ── 3. Start the API server ──────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    // ── 4. Refresh loop ──────────────────────────────────────────────────
    tokio::spawn(scheduler::run_refresh_loop(state.clone(), source));

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    if let Err(e) = state.save_config() {
        error!(error = %e, "Failed to save runtime config on shutdown");
    }

    info!("Option Sniper shut down complete.");
    Ok(())
}
