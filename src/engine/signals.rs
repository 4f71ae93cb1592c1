use crate::config::{EngineConfig, SIGNAL_STEP};

/// Inventory pressure adjustment. Low stock supports a small increase,
/// overstock a small decrease. Unknown supply leaves the price alone.
/// Thresholds are strict inequalities; a value exactly on a threshold is
/// neutral.
pub fn inventory_signal(days_of_supply: Option<f64>, cfg: &EngineConfig) -> f64 {
    match days_of_supply {
        None => 0.0,
        Some(days) if days < cfg.low_supply_days => SIGNAL_STEP,
        Some(days) if days > cfg.high_supply_days => -SIGNAL_STEP,
        Some(_) => 0.0,
    }
}

/// Advertising efficiency adjustment. Inefficient ad spend (high ACOS)
/// pushes the price up to protect margin; efficient spend pushes it down
/// to chase volume.
pub fn ads_signal(acos_clicks_14d: Option<f64>, cfg: &EngineConfig) -> f64 {
    match acos_clicks_14d {
        None => 0.0,
        Some(acos) if acos > cfg.high_acos => SIGNAL_STEP,
        Some(acos) if acos < cfg.low_acos => -SIGNAL_STEP,
        Some(_) => 0.0,
    }
}

/// Return-risk adjustment: fires when the expected cost absorbed by returns
/// exceeds `risk_load_fraction` of the unit cost. Never lowers the price.
pub fn return_risk_signal(return_risk_load: f64, total_cost: f64, cfg: &EngineConfig) -> f64 {
    if return_risk_load > cfg.risk_load_fraction * total_cost {
        SIGNAL_STEP
    } else {
        0.0
    }
}

/// Competitor anchor price: a weighted blend favoring the market average
/// over the seller's own current price. Without competitor data the anchor
/// degenerates to the current price.
pub fn competitor_target(
    avg_competitor_price: Option<f64>,
    current_price: f64,
    cfg: &EngineConfig,
) -> f64 {
    match avg_competitor_price {
        Some(avg) => cfg.competitor_weight * avg + (1.0 - cfg.competitor_weight) * current_price,
        None => current_price,
    }
}
