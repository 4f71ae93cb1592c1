mod api;
mod config;
mod engine;
mod error;
mod ingest;
mod state;
mod types;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::{Config, EngineConfig};
use crate::error::Result;
use crate::state::SkuStore;
use crate::types::RiskLevel;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Dataset bootstrap ---
    let (rows, stats) = ingest::load_dataset(&cfg.dataset_path)?;
    info!(
        "Dataset loaded: {} of {} rows usable from {}",
        stats.loaded, stats.rows_read, cfg.dataset_path,
    );
    info!(
        "[INGEST] rejected: missing_sku={} missing_date={} bad_date={} | degraded cells in {} rows",
        stats.rejected_missing_sku,
        stats.rejected_missing_date,
        stats.rejected_bad_date,
        stats.rows_with_bad_numbers,
    );

    let store = SkuStore::from_rows(rows);
    info!("{} SKUs in store", store.sku_count());

    let engine_cfg = EngineConfig::default();
    log_risk_profile(&store, &engine_cfg);

    // --- HTTP API server ---
    let api_state = ApiState {
        store,
        engine_cfg,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

/// One-shot boot summary: price every SKU's latest row and log the risk
/// spread, so a glance at the log shows the shape of the catalog.
fn log_risk_profile(store: &SkuStore, engine_cfg: &EngineConfig) {
    let mut low = 0usize;
    let mut medium = 0usize;
    let mut high = 0usize;
    let mut unpriceable = 0usize;

    for sku in store.sku_list() {
        let Some(row) = store.latest_row(&sku) else { continue };
        match engine::recommend(&row, engine_cfg) {
            Ok(rec) => match rec.risk_level {
                RiskLevel::Low => low += 1,
                RiskLevel::Medium => medium += 1,
                RiskLevel::High => high += 1,
            },
            Err(e) => {
                warn!(sku = %sku, "unpriceable SKU: {e}");
                unpriceable += 1;
            }
        }
    }

    info!(
        "[BOOT] risk profile: low={low} medium={medium} high={high} unpriceable={unpriceable}"
    );
}
