//! Parts stock export as a spreadsheet-friendly CSV.

use chrono::NaiveDate;
use contracts::domain::a003_part::{Part, EXPORT_COLUMNS};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// `parts-YYYY-MM-DD.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("parts-{}.csv", date.format("%Y-%m-%d"))
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// BOM, header row, then one `;`-separated CRLF-terminated line per part
pub fn write_parts_csv(parts: &[Part]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(EXPORT_COLUMNS)?;
    for part in parts {
        writer.write_record([
            part.part_number().to_string(),
            part.name().to_string(),
            part.category.clone().unwrap_or_default(),
            part.stock_qty.to_string(),
            optional_number(part.purchase_price),
            optional_number(part.sale_price),
            part.currency.clone(),
            part.base.comment.clone().unwrap_or_default(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish CSV export: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_part::stock_import::parse_stock_csv;
    use contracts::domain::a003_part::PartDto;

    fn part(number: &str, name: &str, qty: i32) -> Part {
        Part::new_for_insert(&PartDto {
            part_number: number.into(),
            name: name.into(),
            stock_qty: Some(qty),
            ..Default::default()
        })
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "parts-2024-03-07.csv");
    }

    #[test]
    fn test_layout_and_empty_optionals() {
        let mut p = part("ABC-1", "Brzdová destička", 4);
        p.purchase_price = Some(120.5);

        let bytes = write_parts_csv(&[p]).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text,
            "part_number;name;category;stock_qty;purchase_price;sale_price;currency;note\r\n\
             ABC-1;Brzdová destička;;4;120.5;;CZK;\r\n"
        );
    }

    #[test]
    fn test_cells_with_separators_are_quoted() {
        let mut p = part("X-1", "Šroub; M8", 1);
        p.base.comment = Some("řádek 1\nřádek \"2\"".into());

        let text = String::from_utf8(write_parts_csv(&[p]).unwrap()).unwrap();
        assert!(text.contains("\"Šroub; M8\""));
        assert!(text.contains("\"řádek 1\nřádek \"\"2\"\"\""));
    }

    #[test]
    fn test_export_can_be_imported_back() {
        let mut tricky = part("B;2", "Těsnění \"víko\"", 12);
        tricky.base.comment = Some("víceřádková\npoznámka".into());
        let parts = vec![part("A-1", "Filtr", 3), tricky];

        let bytes = write_parts_csv(&parts).unwrap();
        let parsed = parse_stock_csv(std::str::from_utf8(&bytes).unwrap()).unwrap();

        assert_eq!(parsed.skipped, 0);
        let pairs: Vec<_> = parsed
            .rows
            .iter()
            .map(|r| (r.natural_key.as_str(), r.quantity))
            .collect();
        assert_eq!(pairs, vec![("A-1", 3), ("B;2", 12)]);
    }
}
