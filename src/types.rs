use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetricsRow
// ---------------------------------------------------------------------------

/// One observation for one SKU at one date, as loaded from the merged
/// pricing dataset. Absent cells stay `None`; defaulting to zero (costs)
/// or to the standard margins happens inside the engine, so "absent" and
/// "legitimately zero" remain distinguishable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub sku: String,
    pub date: NaiveDate,
    pub cost: Option<f64>,
    pub fba_fee: Option<f64>,
    pub storage_fee: Option<f64>,
    pub handling_cost: Option<f64>,
    /// Percentage, e.g. 10 means 10%.
    pub minimum_acceptable_margin_pct: Option<f64>,
    /// Percentage, e.g. 25 means 25%.
    pub target_gross_margin_pct: Option<f64>,
    pub current_price: Option<f64>,
    pub days_of_supply: Option<f64>,
    pub avg_competitor_price: Option<f64>,
    pub lowest_competitor_price: Option<f64>,
    pub highest_competitor_price: Option<f64>,
    pub units_shipped_t90: Option<f64>,
    pub returns_t90: Option<f64>,
    pub acos_clicks_14d: Option<f64>,
    pub roas_clicks_14d: Option<f64>,
    /// Daily ordered units. Feeds the sales-trend series only, never the
    /// pricing rules.
    pub units_ordered: Option<f64>,
}

// ---------------------------------------------------------------------------
// Risk classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Adjustment signals
// ---------------------------------------------------------------------------

/// The three independent multiplicative adjustments, each one of
/// {-0.05, 0, +0.05}. They are not mutually exclusive and all apply to the
/// same base price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub inventory: f64,
    pub ads: f64,
    pub return_risk: f64,
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Engine output for one SKU. Every field is derived from the input row;
/// nothing here has an independent lifecycle or is persisted anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub sku: String,
    pub as_of: NaiveDate,
    pub total_cost: f64,
    /// Fraction, e.g. 0.10.
    pub min_margin: f64,
    /// Fraction, e.g. 0.25.
    pub target_margin: f64,
    pub min_price_allowed: f64,
    pub target_price: f64,
    pub current_price: f64,
    /// Fraction. Zero when the current price is unset.
    pub current_margin: f64,
    pub days_of_supply: Option<f64>,
    pub return_risk_load: f64,
    pub signals: Signals,
    pub competitor_target: f64,
    pub recommended_price: f64,
    /// Fraction.
    pub recommended_margin: f64,
    pub risk_level: RiskLevel,
    /// Human-readable reasons in fixed order, never empty.
    pub rationale: Vec<String>,
}
