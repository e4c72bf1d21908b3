use crate::errors::{AppError, AppResult};
use crate::export::excel_date::parse_to_excel_date;
use crate::export::model::{Cell, ExportRow};
use crate::export::notify_export_success;
use crate::ui::messages::info;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use std::path::Path;
use unicode_width::UnicodeWidthStr;

const BAND_ODD: u32 = 0xEAF3FB;
const BAND_EVEN: u32 = 0xFFFFFF;

/// Styled worksheet with a frozen header, zebra rows and fitted columns.
pub(crate) fn export_xlsx<T: ExportRow>(
    rows: &[T],
    currency: &str,
    sheet_name: &str,
    path: &Path,
) -> AppResult<()> {
    info(format!("Exporting to XLSX: {}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_err)?;

    let headers = T::headers(currency);
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0xFFFFFF))
        .set_background_color(Color::RGB(0x2F75B5))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin);

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, header.as_str(), &header_format)
            .map_err(xlsx_err)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;

    let mut widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(h.as_str())).collect();

    for (i, record) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        let band = Color::RGB(if i % 2 == 0 { BAND_ODD } else { BAND_EVEN });

        for (col, cell) in record.cells().iter().enumerate() {
            write_cell(worksheet, row, col as u16, cell, band)?;
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(UnicodeWidthStr::width(cell.to_string().as_str()));
            }
        }
    }

    for (c, w) in widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, *w as f64 + 2.0)
            .map_err(xlsx_err)?;
    }

    workbook.save(path).map_err(xlsx_err)?;
    notify_export_success("XLSX", rows.len(), path);
    Ok(())
}

fn base_format(bg: Color) -> Format {
    Format::new()
        .set_background_color(bg)
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin)
}

fn write_cell(ws: &mut Worksheet, row: u32, col: u16, cell: &Cell, bg: Color) -> AppResult<()> {
    match cell {
        Cell::Money(v) => {
            let fmt = base_format(bg).set_num_format("#,##0.00").set_align(FormatAlign::Right);
            ws.write_with_format(row, col, *v, &fmt).map_err(xlsx_err)?;
        }
        Cell::Int(n) => {
            let fmt = base_format(bg).set_align(FormatAlign::Right);
            ws.write_with_format(row, col, *n as f64, &fmt).map_err(xlsx_err)?;
        }
        Cell::Text(s) => {
            if let Some((num_format, serial)) = parse_to_excel_date(s) {
                let fmt = base_format(bg).set_num_format(num_format);
                ws.write_with_format(row, col, serial, &fmt).map_err(xlsx_err)?;
            } else {
                ws.write_with_format(row, col, s.as_str(), &base_format(bg))
                    .map_err(xlsx_err)?;
            }
        }
    }
    Ok(())
}

fn xlsx_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX: {e}"))
}
