use crate::errors::{AppError, AppResult};
use crate::export::model::{Cell, ExportRow, to_table};
use crate::export::notify_export_success;
use crate::export::pdf::{Align, PdfManager};
use crate::ui::messages::info;
use std::path::Path;

pub(crate) fn export_pdf<T: ExportRow>(
    rows: &[T],
    currency: &str,
    path: &Path,
    title: &str,
    subtitle: &str,
) -> AppResult<()> {
    info(format!("Exporting to PDF: {}", path.display()));

    let headers = T::headers(currency);
    // numbers are right-aligned, judged on the first row
    let align: Vec<Align> = rows
        .first()
        .map(|r| {
            r.cells()
                .iter()
                .map(|c| match c {
                    Cell::Text(_) => Align::Left,
                    Cell::Int(_) | Cell::Money(_) => Align::Right,
                })
                .collect()
        })
        .unwrap_or_else(|| vec![Align::Left; headers.len()]);

    let mut pdf = PdfManager::new();
    pdf.write_table(title, subtitle, &headers, &align, &to_table(rows));
    pdf.save(path)
        .map_err(|e| AppError::Export(format!("PDF: {e}")))?;

    notify_export_success("PDF", rows.len(), path);
    Ok(())
}
