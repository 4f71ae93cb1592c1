use std::sync::Arc;

use dashmap::DashMap;

use crate::types::MetricsRow;

/// In-memory, read-only view of the pricing dataset, keyed by SKU.
///
/// Row selection lives here, not in the engine: the store answers "latest
/// row by date" so the engine only ever sees one representative row per
/// call. Per-SKU histories are kept sorted by date ascending; on equal
/// dates the row that appeared later in the file wins the "latest" slot.
pub struct SkuStore {
    /// sku → rows sorted by date ascending
    rows_by_sku: DashMap<String, Vec<MetricsRow>>,
    /// rows in original file order, for the dataset preview
    file_order: Vec<MetricsRow>,
}

impl SkuStore {
    pub fn from_rows(rows: Vec<MetricsRow>) -> Arc<Self> {
        let rows_by_sku: DashMap<String, Vec<MetricsRow>> = DashMap::new();
        for row in &rows {
            let mut history = rows_by_sku.entry(row.sku.clone()).or_default();
            let at = history.partition_point(|r| r.date <= row.date);
            history.insert(at, row.clone());
        }
        Arc::new(Self {
            rows_by_sku,
            file_order: rows,
        })
    }

    /// All SKUs, sorted, for selector surfaces.
    pub fn sku_list(&self) -> Vec<String> {
        let mut skus: Vec<String> = self.rows_by_sku.iter().map(|e| e.key().clone()).collect();
        skus.sort();
        skus
    }

    /// The representative row for a SKU: the one with the maximum date.
    pub fn latest_row(&self, sku: &str) -> Option<MetricsRow> {
        self.rows_by_sku.get(sku)?.last().cloned()
    }

    /// Up to `limit` most recent rows for a SKU, oldest → newest. Feeds the
    /// trend series.
    pub fn history(&self, sku: &str, limit: usize) -> Vec<MetricsRow> {
        match self.rows_by_sku.get(sku) {
            Some(rows) => {
                let skip = rows.len().saturating_sub(limit);
                rows[skip..].to_vec()
            }
            None => Vec::new(),
        }
    }

    /// First `limit` rows in file order.
    pub fn preview(&self, limit: usize) -> Vec<MetricsRow> {
        self.file_order.iter().take(limit).cloned().collect()
    }

    pub fn sku_count(&self) -> usize {
        self.rows_by_sku.len()
    }

    pub fn row_count(&self) -> usize {
        self.file_order.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
