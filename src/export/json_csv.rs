use crate::errors::{AppError, AppResult};
use crate::export::model::ExportRow;
use crate::export::notify_export_success;
use crate::ui::messages::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Pretty-printed JSON array; keys are the struct field names.
pub(crate) fn export_json<T: Serialize>(rows: &[T], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json = serde_json::to_string_pretty(rows)
        .map_err(|e| AppError::Export(format!("JSON serialization error: {e}")))?;
    fs::write(path, json)?;

    notify_export_success("JSON", rows.len(), path);
    Ok(())
}

/// CSV with human headers (currency in money columns).
pub(crate) fn export_csv<T: ExportRow>(rows: &[T], currency: &str, path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| AppError::Export(format!("CSV open error: {e}")))?;

    wtr.write_record(T::headers(currency))
        .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    for row in rows {
        let record: Vec<String> = row.cells().iter().map(ToString::to_string).collect();
        wtr.write_record(&record)
            .map_err(|e| AppError::Export(format!("CSV write error: {e}")))?;
    }

    wtr.flush()?;
    notify_export_success("CSV", rows.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reports::CategorySales;
    use std::env;

    #[test]
    fn category_csv_has_currency_header() {
        let path = env::temp_dir().join("fastpos_categories_test.csv");
        let rows = vec![
            CategorySales { category: "Pizza".into(), total: 2400.0 },
            CategorySales { category: "Drinks".into(), total: 450.5 },
        ];

        export_csv(&rows, "DA", &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Category,Total Sales (DA)"));
        assert_eq!(lines.next(), Some("Pizza,2400.00"));
        assert_eq!(lines.next(), Some("Drinks,450.50"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn json_uses_field_names() {
        let path = env::temp_dir().join("fastpos_categories_test.json");
        let rows = vec![CategorySales { category: "Pizza".into(), total: 10.0 }];

        export_json(&rows, &path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v[0]["category"], "Pizza");
        assert_eq!(v[0]["total"], 10.0);
        fs::remove_file(&path).ok();
    }
}
