use serde::{Deserialize, Serialize};

/// Columns of the parts stock CSV export, in order
pub const EXPORT_COLUMNS: [&str; 8] = [
    "part_number",
    "name",
    "category",
    "stock_qty",
    "purchase_price",
    "sale_price",
    "currency",
    "note",
];

/// Per-row failure of a stock import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRowError {
    pub natural_key: String,
    pub message: String,
}

/// Outcome of a stock import. Partial success is the normal case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockImportResult {
    pub ok: bool,
    /// Rows that changed a live part. Keys matching no live part are not counted here.
    pub updated: usize,
    /// Data rows dropped by the parser (blank key, blank or non-numeric quantity)
    pub skipped: usize,
    /// Per-row store failures, plus keys matching no live part
    /// (reported as `Díl nenalezen.` instead of counting as updated)
    pub errors: Vec<StockRowError>,
}
