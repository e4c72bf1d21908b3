use crate::core::reports;
use crate::db::orders::{self, OrderFilter};
use crate::db::settings;
use crate::errors::AppResult;
use crate::export::fs_utils::{ensure_writable, require_absolute};
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::{ExportRow, OrderExport};
use crate::export::pdf_export::export_pdf;
use crate::export::xlsx::export_xlsx;
use crate::export::{ExportData, ExportFormat};
use crate::ui::messages::warning;
use crate::utils::date::{DateRange, parse_optional_range, today};
use rusqlite::Connection;
use std::path::Path;

/// Parameters of one `export` invocation.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub data: ExportData,
    pub format: ExportFormat,
    pub file: String,
    /// `None` or "all" for every date
    pub range: Option<String>,
    /// Only orders paid this way (orders dataset)
    pub payment: Option<String>,
    pub force: bool,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Returns the number of exported rows; 0 when nothing was written.
    pub fn export(conn: &Connection, req: &ExportRequest) -> AppResult<usize> {
        let path = Path::new(&req.file);
        require_absolute(path)?;

        let range = parse_optional_range(req.range.as_deref())?;
        let currency = settings::get(conn)?.currency_symbol;

        match req.data {
            ExportData::Orders => {
                let filter = OrderFilter {
                    range,
                    payment_type: req.payment.clone(),
                    status: None,
                };
                let rows: Vec<OrderExport> = orders::filter(conn, &filter)?
                    .into_iter()
                    .filter(|o| o.status != crate::models::order::OrderStatus::Cancelled)
                    .map(OrderExport::from)
                    .collect();
                write(&rows, req, range.as_ref(), &currency, path)
            }
            ExportData::Daily => {
                let rows = reports::daily(conn, range.as_ref())?;
                write(&rows, req, range.as_ref(), &currency, path)
            }
            ExportData::Categories => {
                let rows = reports::category_sales(conn, range.as_ref())?;
                write(&rows, req, range.as_ref(), &currency, path)
            }
        }
    }
}

fn write<T: ExportRow>(
    rows: &[T],
    req: &ExportRequest,
    range: Option<&DateRange>,
    currency: &str,
    path: &Path,
) -> AppResult<usize> {
    if rows.is_empty() {
        warning(format!("No {} found for the selected range.", req.data.as_str()));
        return Ok(0);
    }
    if !ensure_writable(path, req.force)? {
        return Ok(0);
    }

    match req.format {
        ExportFormat::Csv => export_csv(rows, currency, path)?,
        ExportFormat::Json => export_json(rows, path)?,
        ExportFormat::Xlsx => export_xlsx(rows, currency, req.data.as_str(), path)?,
        ExportFormat::Pdf => {
            let title = pdf_title(req.data);
            let subtitle = pdf_subtitle(range);
            export_pdf(rows, currency, path, &title, &subtitle)?
        }
    }
    Ok(rows.len())
}

fn pdf_title(data: ExportData) -> String {
    match data {
        ExportData::Orders => "Orders".to_string(),
        ExportData::Daily => "Daily sales".to_string(),
        ExportData::Categories => "Sales by category".to_string(),
    }
}

fn pdf_subtitle(range: Option<&DateRange>) -> String {
    let period = match range {
        None => "All dates".to_string(),
        Some(r) if r.start == r.end => r.start_str(),
        Some(r) => format!("From {} to {}", r.start_str(), r.end_str()),
    };
    format!("{period} - generated {}", today().format("%Y-%m-%d"))
}
