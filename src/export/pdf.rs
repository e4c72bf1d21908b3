//! Minimal multi-page table writer on top of pdf-writer.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use std::fs;
use std::path::Path;

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 20.0;

const FONT_SIZE: f32 = 10.0;
const HEADER_FONT_SIZE: f32 = 11.0;
const TITLE_FONT_SIZE: f32 = 14.0;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Right,
}

pub struct PdfManager {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    bold_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
}

impl Default for PdfManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfManager {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_id = Ref::new(4);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            bold_id,
            page_refs: Vec::new(),
            next_id: 5,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Register a page and write its content stream.
    fn add_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
                .contents(content_id);
            page.resources()
                .fonts()
                .pair(Name(b"F1"), self.font_id)
                .pair(Name(b"F2"), self.bold_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    /// Rows that fit on one page below the title and header band.
    fn rows_per_page() -> usize {
        let usable = PAGE_H - 2.0 * MARGIN - 30.0 - ROW_H;
        (usable / ROW_H).floor().max(1.0) as usize
    }

    /// Multi-page table: title and subtitle, shaded header band on every page,
    /// zebra rows and "Page n of m" footers.
    pub fn write_table(
        &mut self,
        title: &str,
        subtitle: &str,
        headers: &[String],
        align: &[Align],
        rows: &[Vec<String>],
    ) {
        let widths = column_widths(headers, rows);
        let table_w: f32 = widths.iter().sum();

        let chunks: Vec<&[Vec<String>]> = if rows.is_empty() {
            vec![&rows[..0]]
        } else {
            rows.chunks(Self::rows_per_page()).collect()
        };
        let total_pages = chunks.len();

        for (page_idx, chunk) in chunks.into_iter().enumerate() {
            let mut content = Content::new();

            text(&mut content, b"F2", MARGIN, PAGE_H - MARGIN + 15.0, TITLE_FONT_SIZE, title);
            text(&mut content, b"F1", MARGIN, PAGE_H - MARGIN, FONT_SIZE, subtitle);
            let footer = format!("Page {} of {}", page_idx + 1, total_pages);
            text(&mut content, b"F1", PAGE_W - MARGIN - 70.0, MARGIN - 35.0, FONT_SIZE, &footer);

            let mut y = PAGE_H - MARGIN - 30.0;
            fill(&mut content, MARGIN, y, table_w, (0.85, 0.87, 0.90));
            draw_row(&mut content, b"F2", y, &widths, align, headers, HEADER_FONT_SIZE);
            y -= ROW_H;

            for (i, row) in chunk.iter().enumerate() {
                if i % 2 == 0 {
                    fill(&mut content, MARGIN, y, table_w, (0.96, 0.96, 0.96));
                }
                draw_row(&mut content, b"F1", y, &widths, align, row, FONT_SIZE);
                y -= ROW_H;
            }

            self.add_page(content);
        }
    }

    pub fn save(mut self, path: &Path) -> std::io::Result<()> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        let count = self.page_refs.len() as i32;
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_refs.iter().copied())
            .count(count);

        fs::write(path, self.pdf.finish())
    }
}

/// Type1 standard fonts only cover Latin-1; anything else becomes '?'.
fn pdf_safe(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

fn text(content: &mut Content, font: &[u8], x: f32, y: f32, size: f32, s: &str) {
    let bytes = pdf_safe(s);
    content.begin_text();
    content.set_font(Name(font), size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(&bytes));
    content.end_text();
}

fn fill(content: &mut Content, x: f32, y: f32, w: f32, rgb: (f32, f32, f32)) {
    content.save_state();
    content.set_fill_rgb(rgb.0, rgb.1, rgb.2);
    content.rect(x, y, w, ROW_H);
    content.fill_nonzero();
    content.restore_state();
}

fn draw_row(
    content: &mut Content,
    font: &[u8],
    y: f32,
    widths: &[f32],
    align: &[Align],
    row: &[String],
    size: f32,
) {
    let mut x = MARGIN;
    for (i, cell) in row.iter().enumerate() {
        let w = widths.get(i).copied().unwrap_or(0.0);
        let tx = match align.get(i) {
            Some(Align::Right) => x + w - 4.0 - approx_width(cell, size),
            _ => x + 4.0,
        };
        text(content, font, tx, y + 5.0, size, cell);

        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        content.rect(x, y, w, ROW_H);
        content.stroke();
        content.restore_state();
        x += w;
    }
}

/// Helvetica averages a little over half the font size per character.
fn approx_width(s: &str, size: f32) -> f32 {
    s.chars().count() as f32 * size * 0.55
}

/// Fit columns to their content, scaled down to the printable width.
fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<f32> {
    let mut widths: Vec<f32> = headers
        .iter()
        .map(|h| approx_width(h, HEADER_FONT_SIZE) + 10.0)
        .collect();

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = w.max(approx_width(cell, FONT_SIZE) + 10.0);
            }
        }
    }

    let total: f32 = widths.iter().sum();
    let max = PAGE_W - 2.0 * MARGIN;
    if total > max {
        let scale = max / total;
        for w in &mut widths {
            *w *= scale;
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_tables_span_pages() {
        let headers = vec!["Date".to_string(), "Total".to_string()];
        let rows: Vec<Vec<String>> = (0..100)
            .map(|i| vec![format!("2025-01-{:02}", i % 28 + 1), format!("{i}.00")])
            .collect();

        let mut pdf = PdfManager::new();
        pdf.write_table("Orders", "all dates", &headers, &[Align::Left, Align::Right], &rows);
        assert!(pdf.page_refs.len() >= 3);

        let path = std::env::temp_dir().join("fastpos_pdf_test.pdf");
        pdf.save(&path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(pdf_safe("Café →"), b"Caf? ?".to_vec());
    }
}
