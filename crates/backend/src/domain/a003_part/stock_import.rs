//! Stock quantity import from an uploaded CSV file.
//!
//! Parsing is pure ([`parse_stock_csv`]); writing goes through [`StockWriter`] so
//! one bad row never aborts the batch.

use async_trait::async_trait;
use contracts::domain::a003_part::{StockImportResult, StockRowError};
use sea_orm::DatabaseConnection;
use thiserror::Error;

use super::repository;

pub const NATURAL_KEY_COLUMN: &str = "part_number";
pub const QUANTITY_COLUMN: &str = "stock_qty";

/// One quantity update, keyed by part number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdateRow {
    pub natural_key: String,
    pub quantity: i32,
}

/// Parser output: updates in file order plus the count of dropped data rows
#[derive(Debug, Default, PartialEq)]
pub struct ParsedStock {
    pub rows: Vec<StockUpdateRow>,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum StockImportError {
    #[error("Soubor neobsahuje data.")]
    NoData,

    #[error("CSV musí obsahovat sloupce 'part_number' a 'stock_qty' v první řádce.")]
    MissingColumns,

    #[error("Soubor nelze přečíst jako CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// `;` when the header line contains one, `,` otherwise.
/// Decided once for the whole file.
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') {
        b';'
    } else {
        b','
    }
}

/// Parses a quantity cell: first decimal comma becomes a point, halves round up.
/// `None` for blank, non-numeric, non-finite, negative or out-of-range values.
pub fn parse_quantity(raw: &str) -> Option<i32> {
    let normalized = raw.replacen(',', ".", 1);
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return None;
    }

    let value: f64 = normalized.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    let rounded = (value + 0.5).floor();
    if rounded < 0.0 || rounded > f64::from(i32::MAX) {
        return None;
    }
    Some(rounded as i32)
}

pub fn parse_stock_csv(text: &str) -> Result<ParsedStock, StockImportError> {
    let text = skip_leading_blank_lines(text.trim_start_matches('\u{FEFF}'));

    let non_blank_lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank_lines < 2 {
        return Err(StockImportError::NoData);
    }

    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);
    let text = strip_field_padding(text, delimiter);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (key_idx, qty_idx) = match (column(NATURAL_KEY_COLUMN), column(QUANTITY_COLUMN)) {
        (Some(k), Some(q)) => (k, q),
        _ => return Err(StockImportError::MissingColumns),
    };

    let mut parsed = ParsedStock::default();
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed CSV record: {}", e);
                parsed.skipped += 1;
                continue;
            }
        };

        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let natural_key = record.get(key_idx).unwrap_or_default().trim();
        let quantity = record.get(qty_idx).and_then(parse_quantity);

        match quantity {
            Some(quantity) if !natural_key.is_empty() => parsed.rows.push(StockUpdateRow {
                natural_key: natural_key.to_string(),
                quantity,
            }),
            _ => {
                tracing::debug!(
                    "Skipping stock row {:?}: key={:?} qty={:?}",
                    record.position().map(|p| p.line()),
                    natural_key,
                    record.get(qty_idx)
                );
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn skip_leading_blank_lines(text: &str) -> &str {
    let mut rest = text;
    while let Some(pos) = rest.find('\n') {
        if !rest[..pos].trim().is_empty() {
            break;
        }
        rest = &rest[pos + 1..];
    }
    rest
}

/// Drops spaces and tabs at the start of every unquoted field, so a quote
/// preceded by padding (`  "A;1";2`, `B; "3,5"`) still opens a quoted field.
/// Quoted content, including embedded newlines, is copied unchanged.
fn strip_field_padding(text: &str, delimiter: u8) -> String {
    let delimiter = char::from(delimiter);
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut at_field_start = true;
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    out.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        if at_field_start && (c == ' ' || c == '\t') {
            continue;
        }
        if at_field_start && c == '"' {
            in_quotes = true;
        }
        out.push(c);
        at_field_start = c == delimiter || c == '\n';
    }
    out
}

/// Store seam of the import: sets the quantity of the part with a natural key
#[async_trait]
pub trait StockWriter: Send + Sync {
    /// Returns the number of records updated; 0 means no such part
    async fn set_stock_qty(&self, natural_key: &str, quantity: i32) -> anyhow::Result<u64>;
}

/// Writes through the part repository
pub struct RepositoryStockWriter<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RepositoryStockWriter<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StockWriter for RepositoryStockWriter<'_> {
    async fn set_stock_qty(&self, natural_key: &str, quantity: i32) -> anyhow::Result<u64> {
        repository::set_stock_qty_in(self.db, natural_key, quantity).await
    }
}

/// Applies updates in file order. Duplicate keys are written again, so the
/// last occurrence wins. Failures are collected per row.
pub async fn apply_stock_updates(writer: &dyn StockWriter, parsed: ParsedStock) -> StockImportResult {
    let mut updated = 0usize;
    let mut errors = Vec::new();

    for row in parsed.rows {
        match writer.set_stock_qty(&row.natural_key, row.quantity).await {
            Ok(0) => {
                tracing::warn!("Stock import: part {} not found", row.natural_key);
                errors.push(StockRowError {
                    natural_key: row.natural_key,
                    message: "Díl nenalezen.".into(),
                });
            }
            Ok(_) => updated += 1,
            Err(e) => {
                tracing::error!("Error updating part {}: {:#}", row.natural_key, e);
                errors.push(StockRowError {
                    natural_key: row.natural_key,
                    message: e.to_string(),
                });
            }
        }
    }

    StockImportResult {
        ok: true,
        updated,
        skipped: parsed.skipped,
        errors,
    }
}

/// Parses the upload and writes quantities to the part repository
pub async fn import_stock_csv(text: &str) -> Result<StockImportResult, StockImportError> {
    let parsed = parse_stock_csv(text)?;
    tracing::info!(
        "Stock import: {} rows to update, {} skipped",
        parsed.rows.len(),
        parsed.skipped
    );

    let writer = RepositoryStockWriter::new(repository::conn());
    let result = apply_stock_updates(&writer, parsed).await;
    tracing::info!(
        "Stock import complete: {} updated, {} errors",
        result.updated,
        result.errors.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn row(key: &str, quantity: i32) -> StockUpdateRow {
        StockUpdateRow {
            natural_key: key.into(),
            quantity,
        }
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("part_number;stock_qty"), b';');
        assert_eq!(detect_delimiter("part_number,stock_qty"), b',');
        assert_eq!(detect_delimiter("\"a;b\",stock_qty"), b';');
    }

    #[test]
    fn test_parse_quantity_rounding() {
        assert_eq!(parse_quantity("3,0"), Some(3));
        assert_eq!(parse_quantity("12,5"), Some(13));
        assert_eq!(parse_quantity("2.5"), Some(3));
        assert_eq!(parse_quantity("2.49"), Some(2));
        assert_eq!(parse_quantity(" 7 "), Some(7));
        assert_eq!(parse_quantity("-0,4"), Some(0));
    }

    #[test]
    fn test_parse_quantity_rejects_garbage() {
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("   "), None);
        assert_eq!(parse_quantity("inf"), None);
        assert_eq!(parse_quantity("NaN"), None);
        assert_eq!(parse_quantity("-2"), None);
        assert_eq!(parse_quantity("1e12"), None);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let parsed = parse_stock_csv("part_number;stock_qty\nABC-1;5\nDEF-2;\nGHI-3;x\n").unwrap();
        assert_eq!(parsed.rows, vec![row("ABC-1", 5)]);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_comma_delimited_with_quoted_decimal_comma() {
        let text = "name,part_number,stock_qty\r\n\"Filtr, olejový\",F-1,\"12,5\"\r\n\"Řetěz \"\"XL\"\"\",R-2,4\r\n";
        let parsed = parse_stock_csv(text).unwrap();
        assert_eq!(parsed.rows, vec![row("F-1", 13), row("R-2", 4)]);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_quoted_delimiter_does_not_split() {
        let text = "part_number;stock_qty;note\n\"A;1\";2;\"x;y\"\n";
        let parsed = parse_stock_csv(text).unwrap();
        assert_eq!(parsed.rows, vec![row("A;1", 2)]);
    }

    #[test]
    fn test_padding_before_quoted_fields() {
        let parsed = parse_stock_csv("part_number;stock_qty\n  \"A;1\";2\n").unwrap();
        assert_eq!(parsed.rows, vec![row("A;1", 2)]);

        let parsed = parse_stock_csv("part_number;stock_qty\nB; \"3,5\"\n").unwrap();
        assert_eq!(parsed.rows, vec![row("B", 4)]);
        assert_eq!(parsed.skipped, 0);

        let parsed = parse_stock_csv("part_number;stock_qty\n\"A;1\" ;2\n").unwrap();
        assert_eq!(parsed.rows, vec![row("A;1", 2)]);
    }

    #[test]
    fn test_padding_inside_quotes_is_kept() {
        let text = "part_number,stock_qty,note\n\t\"K-1\", \"5\",\"  a\n   b\"\n";
        let parsed = parse_stock_csv(text).unwrap();
        assert_eq!(parsed.rows, vec![row("K-1", 5)]);
        assert_eq!(strip_field_padding("x, \"  a\"\"b\"", b','), "x,\"  a\"\"b\"");
    }

    #[test]
    fn test_blank_lines_bom_and_trimmed_cells() {
        let text = "\u{FEFF}\n  \n part_number ; stock_qty \n\n  K-1 ; 3 \n\n";
        let parsed = parse_stock_csv(text).unwrap();
        assert_eq!(parsed.rows, vec![row("K-1", 3)]);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let parsed = parse_stock_csv("part_number;stock_qty\nA;1\nB;2\nA;3\n").unwrap();
        assert_eq!(parsed.rows, vec![row("A", 1), row("B", 2), row("A", 3)]);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let parsed = parse_stock_csv("stock_qty;part_number\n5\n6;P-6\n").unwrap();
        assert_eq!(parsed.rows, vec![row("P-6", 6)]);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_missing_column_is_rejected() {
        let err = parse_stock_csv("part_number;qty\nA;1\n").unwrap_err();
        assert!(matches!(err, StockImportError::MissingColumns));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(matches!(
            parse_stock_csv("").unwrap_err(),
            StockImportError::NoData
        ));
        assert!(matches!(
            parse_stock_csv("\n \r\n\n").unwrap_err(),
            StockImportError::NoData
        ));
        assert!(matches!(
            parse_stock_csv("part_number;stock_qty\n\n").unwrap_err(),
            StockImportError::NoData
        ));
    }

    /// In-memory part store keyed by part number
    struct FakeWriter {
        stock: Mutex<HashMap<String, i32>>,
        broken_key: Option<&'static str>,
    }

    impl FakeWriter {
        fn with_parts(keys: &[&str]) -> Self {
            Self {
                stock: Mutex::new(keys.iter().map(|k| (k.to_string(), 0)).collect()),
                broken_key: None,
            }
        }

        fn qty(&self, key: &str) -> Option<i32> {
            self.stock.lock().unwrap().get(key).copied()
        }
    }

    #[async_trait]
    impl StockWriter for FakeWriter {
        async fn set_stock_qty(&self, natural_key: &str, quantity: i32) -> anyhow::Result<u64> {
            if self.broken_key == Some(natural_key) {
                anyhow::bail!("database is locked");
            }
            let mut stock = self.stock.lock().unwrap();
            match stock.get_mut(natural_key) {
                Some(qty) => {
                    *qty = quantity;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }

    #[tokio::test]
    async fn test_apply_collects_partial_failures() {
        let mut writer = FakeWriter::with_parts(&["A", "B", "C"]);
        writer.broken_key = Some("B");

        let parsed = ParsedStock {
            rows: vec![row("A", 4), row("B", 5), row("Z", 6), row("C", 7)],
            skipped: 2,
        };
        let result = apply_stock_updates(&writer, parsed).await;

        assert!(result.ok);
        assert_eq!(result.updated, 2);
        assert_eq!(result.skipped, 2);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].natural_key, "B");
        assert_eq!(result.errors[0].message, "database is locked");
        assert_eq!(result.errors[1].natural_key, "Z");
        assert_eq!(writer.qty("A"), Some(4));
        assert_eq!(writer.qty("C"), Some(7));
    }

    #[tokio::test]
    async fn test_last_duplicate_wins() {
        let writer = FakeWriter::with_parts(&["A"]);
        let parsed = parse_stock_csv("part_number,stock_qty\nA,1\nA,9\n").unwrap();

        let result = apply_stock_updates(&writer, parsed).await;

        assert_eq!(result.updated, 2);
        assert_eq!(writer.qty("A"), Some(9));
    }

    #[tokio::test]
    async fn test_deleted_part_is_reported_not_found() {
        use crate::shared::data::db::connect_in_memory;
        use contracts::domain::a003_part::{Part, PartDto};

        let db = connect_in_memory().await.unwrap();
        for number in ["L-1", "D-1"] {
            let mut part = Part::new_for_insert(&PartDto {
                part_number: number.into(),
                name: "Brzdové lanko".into(),
                ..Default::default()
            });
            part.before_write();
            let id = repository::insert_in(&db, &part).await.unwrap();
            if number == "D-1" {
                repository::soft_delete_in(&db, id).await.unwrap();
            }
        }

        let parsed = parse_stock_csv("part_number;stock_qty\nL-1;4\nD-1;6\n").unwrap();
        let result = apply_stock_updates(&RepositoryStockWriter::new(&db), parsed).await;

        assert_eq!(result.updated, 1);
        assert_eq!(
            result.errors,
            vec![StockRowError {
                natural_key: "D-1".into(),
                message: "Díl nenalezen.".into(),
            }]
        );
    }
}
