use crate::error::{AppError, Result};

/// Margin percentage applied when a row carries no minimum acceptable margin.
pub const DEFAULT_MIN_MARGIN_PCT: f64 = 10.0;

/// Margin percentage applied when a row carries no target gross margin.
pub const DEFAULT_TARGET_MARGIN_PCT: f64 = 25.0;

/// Magnitude of every adjustment signal. Signals are one of
/// {-SIGNAL_STEP, 0, +SIGNAL_STEP} and compound multiplicatively.
pub const SIGNAL_STEP: f64 = 0.05;

/// Rows shown by /dataset/preview when no limit is given.
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Rows returned by /skus/:sku/history when no limit is given.
pub const DEFAULT_HISTORY_ROWS: usize = 90;

/// Pricing-rule thresholds and blend weights.
///
/// Every business constant the engine consults lives here so tests can probe
/// boundary values without touching engine logic. `Default` carries the
/// production values.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Below this many days of supply the stock is considered low.
    pub low_supply_days: f64,
    /// Above this many days of supply the stock is considered overstock.
    pub high_supply_days: f64,
    /// Below this ACOS the ad spend is considered efficient.
    pub low_acos: f64,
    /// Above this ACOS the ad spend is considered inefficient.
    pub high_acos: f64,
    /// Return-risk load above `risk_load_fraction * total_cost` flags risk.
    pub risk_load_fraction: f64,
    /// Weight of the average competitor price in the competitor target;
    /// the remainder goes to the seller's current price.
    pub competitor_weight: f64,
    /// Weight of the signal-adjusted price in the final blend;
    /// the remainder goes to the competitor target.
    pub signal_blend_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_supply_days: 20.0,
            high_supply_days: 90.0,
            low_acos: 20.0,
            high_acos: 40.0,
            risk_load_fraction: 0.2,
            competitor_weight: 0.7,
            signal_blend_weight: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the merged pricing dataset CSV (DATASET_PATH).
    pub dataset_path: String,
    pub log_level: String,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            dataset_path: std::env::var("DATASET_PATH")
                .unwrap_or_else(|_| "merged_pricing_dataset.csv".to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
        })
    }
}
