use serde::de::DeserializeOwned;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror routes.rs shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
#[allow(dead_code)]
pub struct HealthResponse {
    pub status: Option<String>,
    pub skus: Option<u64>,
    pub rows: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct SkuOverview {
    pub sku: String,
    pub as_of: String,
    pub current_price: Option<f64>,
    pub recommended_price: Option<f64>,
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct Signals {
    pub inventory: f64,
    pub ads: f64,
    pub return_risk: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct RecommendationResponse {
    pub sku: String,
    pub as_of: String,
    pub total_cost: f64,
    pub min_margin: f64,
    pub target_margin: f64,
    pub min_price_allowed: f64,
    pub target_price: f64,
    pub current_price: f64,
    pub current_margin: f64,
    pub days_of_supply: Option<f64>,
    pub return_risk_load: f64,
    pub signals: Signals,
    pub competitor_target: f64,
    pub recommended_price: f64,
    pub recommended_margin: f64,
    pub risk_level: String,
    pub rationale: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct HistoryPoint {
    pub date: String,
    pub units_ordered: Option<f64>,
    pub current_price: Option<f64>,
    pub avg_competitor_price: Option<f64>,
    pub acos_clicks_14d: Option<f64>,
    pub roas_clicks_14d: Option<f64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub health: HealthResponse,
    pub skus: Vec<SkuOverview>,
    /// Full recommendation for the selected SKU, fetched on Enter.
    pub detail: Option<RecommendationResponse>,
    /// Trend rows for the selected SKU, oldest first.
    pub history: Vec<HistoryPoint>,
    pub last_refresh: std::time::Instant,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            health: HealthResponse::default(),
            skus: Vec::new(),
            detail: None,
            history: Vec::new(),
            last_refresh: std::time::Instant::now(),
            base_url,
        }
    }

    /// Re-fetch the overview surfaces, plus the detail pane if a SKU is
    /// selected. Connection status reflects the health probe.
    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let health_url = format!("{}/health", self.base_url);
        match fetch_json::<HealthResponse>(client, &health_url).await {
            Ok(h) => {
                self.health = h;
                self.status = ConnectionStatus::Connected;
            }
            Err(e) => {
                self.status = ConnectionStatus::Error(e);
            }
        }

        let skus_url = format!("{}/skus", self.base_url);
        if let Ok(skus) = fetch_json::<Vec<SkuOverview>>(client, &skus_url).await {
            self.skus = skus;
        }

        if let Some(sku) = self.detail.as_ref().map(|d| d.sku.clone()) {
            self.select_sku(client, &sku).await;
        }

        self.last_refresh = std::time::Instant::now();
    }

    /// Load the detail pane for one SKU: full recommendation + trend rows.
    pub async fn select_sku(&mut self, client: &reqwest::Client, sku: &str) {
        let rec_url = format!("{}/skus/{}/recommendation", self.base_url, sku);
        if let Ok(rec) = fetch_json::<RecommendationResponse>(client, &rec_url).await {
            self.detail = Some(rec);
        }

        let hist_url = format!("{}/skus/{}/history?limit=90", self.base_url, sku);
        if let Ok(points) = fetch_json::<Vec<HistoryPoint>>(client, &hist_url).await {
            self.history = points;
        }
    }

    pub fn clear_selection(&mut self) {
        self.detail = None;
        self.history.clear();
    }

    /// Sales-trend sparkline input: daily ordered units, oldest first.
    pub fn sales_series(&self) -> Vec<u64> {
        self.history
            .iter()
            .map(|p| p.units_ordered.unwrap_or(0.0).max(0.0).round() as u64)
            .collect()
    }
}

async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, String> {
    let resp = client.get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("{} → {}", url, resp.status()));
    }
    resp.json::<T>().await.map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_money(v: f64) -> String {
    format!("${v:.2}")
}

pub fn format_opt_money(v: Option<f64>) -> String {
    v.map_or("—".to_string(), format_money)
}

/// Fraction → percent display, e.g. 0.25 → "25.0%".
pub fn format_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn format_opt_days(v: Option<f64>) -> String {
    v.map_or("N/A".to_string(), |d| format!("{d:.0}"))
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
