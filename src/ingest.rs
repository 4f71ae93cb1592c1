use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::error::{AppError, Result};
use crate::types::MetricsRow;

/// Per-reason accounting for rows dropped during ingest. Rows without a SKU
/// or a usable date never reach the engine; everything else degrades to
/// absent fields rather than being rejected.
#[derive(Debug, Default)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rejected_missing_sku: usize,
    pub rejected_missing_date: usize,
    pub rejected_bad_date: usize,
    /// Rows kept despite at least one unparseable numeric cell.
    pub rows_with_bad_numbers: usize,
    pub loaded: usize,
}

/// Load the merged pricing dataset from `path`.
pub fn load_dataset(path: &str) -> Result<(Vec<MetricsRow>, IngestStats)> {
    let file = File::open(path)
        .map_err(|e| AppError::Config(format!("failed to open dataset '{path}': {e}")))?;
    read_rows(file)
}

/// Parse metric rows from any CSV source. Kept separate from the file-open
/// path so tests can feed in-memory documents.
pub fn read_rows<R: Read>(source: R) -> Result<(Vec<MetricsRow>, IngestStats)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let columns = Columns::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut stats = IngestStats::default();

    for record in reader.records() {
        let record = record?;
        stats.rows_read += 1;

        let sku = match cell(&record, Some(columns.sku)) {
            Some(s) => s.to_string(),
            None => {
                stats.rejected_missing_sku += 1;
                continue;
            }
        };

        let date = match cell(&record, Some(columns.date)) {
            Some(raw) => match parse_date(raw) {
                Some(d) => d,
                None => {
                    stats.rejected_bad_date += 1;
                    continue;
                }
            },
            None => {
                stats.rejected_missing_date += 1;
                continue;
            }
        };

        let mut bad_number = false;
        let mut num = |idx: Option<usize>| opt_f64(&record, idx, &mut bad_number);

        let row = MetricsRow {
            sku,
            date,
            cost: num(columns.cost),
            fba_fee: num(columns.fba_fee),
            storage_fee: num(columns.storage_fee),
            handling_cost: num(columns.handling_cost),
            minimum_acceptable_margin_pct: num(columns.min_margin_pct),
            target_gross_margin_pct: num(columns.target_margin_pct),
            current_price: num(columns.current_price),
            days_of_supply: num(columns.days_of_supply),
            avg_competitor_price: num(columns.avg_competitor_price),
            lowest_competitor_price: num(columns.lowest_competitor_price),
            highest_competitor_price: num(columns.highest_competitor_price),
            units_shipped_t90: num(columns.units_shipped_t90),
            returns_t90: num(columns.returns_t90),
            acos_clicks_14d: num(columns.acos_clicks_14d),
            roas_clicks_14d: num(columns.roas_clicks_14d),
            units_ordered: num(columns.units_ordered),
        };

        if bad_number {
            stats.rows_with_bad_numbers += 1;
        }
        rows.push(row);
    }

    stats.loaded = rows.len();
    Ok((rows, stats))
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Column indexes resolved once per file. SKU and date are the only columns
/// the schema requires; every metric column is optional.
struct Columns {
    sku: usize,
    date: usize,
    cost: Option<usize>,
    fba_fee: Option<usize>,
    storage_fee: Option<usize>,
    handling_cost: Option<usize>,
    min_margin_pct: Option<usize>,
    target_margin_pct: Option<usize>,
    current_price: Option<usize>,
    days_of_supply: Option<usize>,
    avg_competitor_price: Option<usize>,
    lowest_competitor_price: Option<usize>,
    highest_competitor_price: Option<usize>,
    units_shipped_t90: Option<usize>,
    returns_t90: Option<usize>,
    acos_clicks_14d: Option<usize>,
    roas_clicks_14d: Option<usize>,
    units_ordered: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let map = build_header_map(headers);
        let find = |names: &[&str]| names.iter().find_map(|n| map.get(*n).copied());

        let sku = find(&["sku"]).ok_or_else(|| {
            AppError::Config("dataset is missing the required 'SKU' column".to_string())
        })?;
        let date = find(&["date"]).ok_or_else(|| {
            AppError::Config("dataset is missing the required 'Date' column".to_string())
        })?;

        Ok(Self {
            sku,
            date,
            cost: find(&["cost"]),
            fba_fee: find(&["fba_fee"]),
            storage_fee: find(&["storage_fee"]),
            handling_cost: find(&["handling_cost"]),
            // "Minimum_Acceptable_Margin_%" normalizes with the '%' stripped
            min_margin_pct: find(&["minimum_acceptable_margin", "minimum_acceptable_margin_pct"]),
            target_margin_pct: find(&["target_gross_margin", "target_gross_margin_pct"]),
            current_price: find(&["current_price"]),
            days_of_supply: find(&["days_of_supply"]),
            avg_competitor_price: find(&["avg_competitor_price"]),
            lowest_competitor_price: find(&["lowest_competitor_price"]),
            highest_competitor_price: find(&["highest_competitor_price"]),
            units_shipped_t90: find(&["units_shipped_t90"]),
            returns_t90: find(&["returns_t90"]),
            acos_clicks_14d: find(&["acosclicks14d", "acos_clicks_14d"]),
            roas_clicks_14d: find(&["roasclicks14d", "roas_clicks_14d"]),
            units_ordered: find(&["units_ordered"]),
        })
    }
}

/// Map normalized header name → column index. First occurrence wins.
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, raw) in headers.iter().enumerate() {
        map.entry(normalize_header(raw)).or_insert(idx);
    }
    map
}

/// Lowercase, collapse every non-alphanumeric run to a single underscore,
/// and trim underscores: `Minimum_Acceptable_Margin_%` → `minimum_acceptable_margin`,
/// `Units Ordered` → `units_ordered`, `acosClicks14d` → `acosclicks14d`.
fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

fn cell<'r>(record: &'r StringRecord, idx: Option<usize>) -> Option<&'r str> {
    let value = record.get(idx?)?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse an optional numeric cell. Empty or missing is absent; a present but
/// unparseable value is also treated as absent and flagged on the row.
fn opt_f64(record: &StringRecord, idx: Option<usize>, bad_number: &mut bool) -> Option<f64> {
    let raw = cell(record, idx)?;
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            *bad_number = true;
            None
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(doc: &str) -> (Vec<MetricsRow>, IngestStats) {
        read_rows(doc.as_bytes()).unwrap()
    }

    #[test]
    fn original_dataset_headers_resolve() {
        let doc = "\
SKU,Date,Cost,FBA_Fee,Storage_Fee,Handling_Cost,Minimum_Acceptable_Margin_%,Target_Gross_Margin_%,Current_Price,days_of_supply,Avg_Competitor_Price,units_shipped_t90,returns_t90,acosClicks14d,roasClicks14d,Units Ordered
A-1,2024-06-01,10,3,1,1,10,25,18,15,22,100,5,50,2.1,7
";
        let (rows, stats) = load(doc);
        assert_eq!(stats.loaded, 1);
        let row = &rows[0];
        assert_eq!(row.sku, "A-1");
        assert_eq!(row.cost, Some(10.0));
        assert_eq!(row.minimum_acceptable_margin_pct, Some(10.0));
        assert_eq!(row.target_gross_margin_pct, Some(25.0));
        assert_eq!(row.acos_clicks_14d, Some(50.0));
        assert_eq!(row.roas_clicks_14d, Some(2.1));
        assert_eq!(row.units_ordered, Some(7.0));
    }

    #[test]
    fn empty_cells_are_absent_not_zero() {
        let doc = "\
SKU,Date,Cost,days_of_supply,acosClicks14d
A-1,2024-06-01,10,,
";
        let (rows, stats) = load(doc);
        assert_eq!(stats.loaded, 1);
        assert_eq!(rows[0].days_of_supply, None);
        assert_eq!(rows[0].acos_clicks_14d, None);
        assert_eq!(stats.rows_with_bad_numbers, 0);
    }

    #[test]
    fn rows_without_sku_or_date_are_dropped_and_counted() {
        let doc = "\
SKU,Date,Cost
,2024-06-01,10
A-1,,10
A-1,not-a-date,10
A-2,2024-06-01,10
";
        let (rows, stats) = load(doc);
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rejected_missing_sku, 1);
        assert_eq!(stats.rejected_missing_date, 1);
        assert_eq!(stats.rejected_bad_date, 1);
        assert_eq!(stats.loaded, 1);
        assert_eq!(rows[0].sku, "A-2");
    }

    #[test]
    fn unparseable_numbers_degrade_to_absent() {
        let doc = "\
SKU,Date,Cost,Current_Price
A-1,2024-06-01,oops,18
";
        let (rows, stats) = load(doc);
        assert_eq!(stats.loaded, 1);
        assert_eq!(stats.rows_with_bad_numbers, 1);
        assert_eq!(rows[0].cost, None);
        assert_eq!(rows[0].current_price, Some(18.0));
    }

    #[test]
    fn slash_dates_are_accepted() {
        let doc = "\
SKU,Date
A-1,06/02/2024
";
        let (rows, _) = load(doc);
        assert_eq!(
            rows[0].date,
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let doc = "Sku_Code,Date\nA-1,2024-06-01\n";
        let err = read_rows(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
