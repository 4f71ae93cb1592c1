use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{EngineConfig, DEFAULT_HISTORY_ROWS, DEFAULT_PREVIEW_ROWS};
use crate::engine;
use crate::error::AppError;
use crate::state::SkuStore;
use crate::types::{MetricsRow, Recommendation, RiskLevel};

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<SkuStore>,
    pub engine_cfg: EngineConfig,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/skus", get(get_skus))
        .route("/skus/:sku/recommendation", get(get_recommendation))
        .route("/skus/:sku/history", get(get_history))
        .route("/dataset/preview", get(get_preview))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct PreviewQuery {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One line of the SKU overview listing. A SKU whose latest row cannot be
/// priced (margin misconfiguration) still appears, with the recommendation
/// fields nulled out.
#[derive(Serialize)]
pub struct SkuOverview {
    pub sku: String,
    pub as_of: NaiveDate,
    pub current_price: Option<f64>,
    pub recommended_price: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

/// One point of the per-SKU trend series: sales, own vs. competitor price,
/// and ads performance over time.
#[derive(Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub units_ordered: Option<f64>,
    pub current_price: Option<f64>,
    pub avg_competitor_price: Option<f64>,
    pub acos_clicks_14d: Option<f64>,
    pub roas_clicks_14d: Option<f64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "skus": state.store.sku_count(),
        "rows": state.store.row_count(),
    }))
}

async fn get_skus(State(state): State<ApiState>) -> Json<Vec<SkuOverview>> {
    let overview = state
        .store
        .sku_list()
        .into_iter()
        .filter_map(|sku| {
            let row = state.store.latest_row(&sku)?;
            let entry = match engine::recommend(&row, &state.engine_cfg) {
                Ok(rec) => SkuOverview {
                    sku,
                    as_of: row.date,
                    current_price: row.current_price,
                    recommended_price: Some(rec.recommended_price),
                    risk_level: Some(rec.risk_level),
                },
                Err(e) => {
                    warn!(sku = %sku, "overview pricing failed: {e}");
                    SkuOverview {
                        sku,
                        as_of: row.date,
                        current_price: row.current_price,
                        recommended_price: None,
                        risk_level: None,
                    }
                }
            };
            Some(entry)
        })
        .collect();

    Json(overview)
}

async fn get_recommendation(
    State(state): State<ApiState>,
    Path(sku): Path<String>,
) -> Result<Json<Recommendation>, AppError> {
    let row = state
        .store
        .latest_row(&sku)
        .ok_or_else(|| AppError::EmptySelection(sku.clone()))?;

    let rec = engine::recommend(&row, &state.engine_cfg)?;
    Ok(Json(rec))
}

async fn get_history(
    State(state): State<ApiState>,
    Path(sku): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryPoint>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_ROWS);
    let rows = state.store.history(&sku, limit);
    if rows.is_empty() {
        return Err(AppError::EmptySelection(sku));
    }

    let points = rows
        .into_iter()
        .map(|r| HistoryPoint {
            date: r.date,
            units_ordered: r.units_ordered,
            current_price: r.current_price,
            avg_competitor_price: r.avg_competitor_price,
            acos_clicks_14d: r.acos_clicks_14d,
            roas_clicks_14d: r.roas_clicks_14d,
        })
        .collect();

    Ok(Json(points))
}

async fn get_preview(
    State(state): State<ApiState>,
    Query(params): Query<PreviewQuery>,
) -> Json<Vec<MetricsRow>> {
    let limit = params.limit.unwrap_or(DEFAULT_PREVIEW_ROWS);
    Json(state.store.preview(limit))
}
