use crate::db::SalesRecord;
use crate::error::IngestError;
use chrono::{DateTime, Utc};
use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, warn};

const SALES_ID: &str = "sales_id";
const CUSTOMER_ID: &str = "customer_id";
const COUNTRY: &str = "country";
const COST: &str = "cost";
const DATE: &str = "date";

const REQUIRED: [&str; 4] = [SALES_ID, CUSTOMER_ID, COUNTRY, COST];

/// Summary of a successful upload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IngestReport {
    pub rows: usize,
    pub columns_ignored: Vec<String>,
    pub ingested_at: DateTime<Utc>,
}

/// Parsed upload, ready to replace the `sales` table.
#[derive(Debug)]
pub struct ParsedSales {
    pub records: Vec<SalesRecord>,
    pub columns_ignored: Vec<String>,
}

/// `Sales ID`, ` sales-id ` and `SALES_ID` all map to `sales_id`.
fn normalize_header(h: &str) -> String {
    h.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

struct ColumnMap {
    sales_id: usize,
    customer_id: usize,
    country: usize,
    cost: usize,
    date: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<(Self, Vec<String>), IngestError> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns(missing));
        }

        let ignored = headers
            .iter()
            .zip(&normalized)
            .filter(|(_, n)| !REQUIRED.contains(&n.as_str()) && n.as_str() != DATE)
            .map(|(raw, _)| raw.to_string())
            .collect();

        // find() returned Some for every required name above
        let map = ColumnMap {
            sales_id: find(SALES_ID).unwrap_or_default(),
            customer_id: find(CUSTOMER_ID).unwrap_or_default(),
            country: find(COUNTRY).unwrap_or_default(),
            cost: find(COST).unwrap_or_default(),
            date: find(DATE),
        };
        Ok((map, ignored))
    }
}

/// Parse an uploaded CSV into sales rows. Nothing is written here; a failure
/// anywhere rejects the whole file.
pub fn parse_sales_csv(bytes: &[u8]) -> Result<ParsedSales, IngestError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let (cols, columns_ignored) = ColumnMap::resolve(&headers)?;
    if !columns_ignored.is_empty() {
        warn!(columns = ?columns_ignored, "ignoring unknown CSV columns");
    }

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("");

        let sales_id = field(cols.sales_id)
            .parse::<i64>()
            .map_err(|_| IngestError::InvalidField {
                row,
                column: SALES_ID,
                value: field(cols.sales_id).to_string(),
            })?;
        // SQLite stores NaN as NULL, which the NOT NULL cost column rejects
        let cost = field(cols.cost)
            .parse::<f64>()
            .ok()
            .filter(|c| !c.is_nan())
            .ok_or_else(|| IngestError::InvalidField {
                row,
                column: COST,
                value: field(cols.cost).to_string(),
            })?;

        records.push(SalesRecord {
            sales_id,
            customer_id: field(cols.customer_id).to_string(),
            country: field(cols.country).to_string(),
            date: cols.date.map(field).unwrap_or_default().to_string(),
            cost,
        });
    }

    debug!(rows = records.len(), "parsed sales CSV");
    Ok(ParsedSales {
        records,
        columns_ignored,
    })
}
