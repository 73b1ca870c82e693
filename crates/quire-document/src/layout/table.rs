// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Column sizing and pagination for tabular input.
//
// Widths are estimated from the first rows only, clamped per column, then
// shrunk proportionally when the table is wider than the page. Cells that
// still do not fit are cut short with "..".

use quire_core::error::Result;
use quire_core::types::{ColumnWidths, DrawInstruction};
use tracing::{debug, instrument};

use super::cursor::{LINE_HEIGHT_FACTOR, PageGeometry, Paginator};
use super::metrics::TextMeasure;
use crate::input::sheet::Sheet;

pub const MIN_COLUMN_WIDTH: f32 = 50.0;
pub const MAX_COLUMN_WIDTH: f32 = 200.0;
/// Estimated width of one character when sizing columns.
pub const CHAR_WIDTH_ESTIMATE: f32 = 6.0;
/// Rows inspected when sizing columns.
pub const SAMPLE_ROWS: usize = 10;
pub const TRUNCATION_SUFFIX: &str = "..";

/// Column widths before any shrinking to fit the page.
pub fn natural_column_widths(rows: &[Vec<String>]) -> Vec<f32> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![MIN_COLUMN_WIDTH; columns];

    for row in rows.iter().take(SAMPLE_ROWS) {
        for (column, cell) in row.iter().enumerate() {
            let estimate =
                (cell.chars().count() as f32 * CHAR_WIDTH_ESTIMATE).min(MAX_COLUMN_WIDTH);
            if estimate > widths[column] {
                widths[column] = estimate;
            }
        }
    }

    widths
}

/// Final widths for a sheet: natural widths scaled uniformly so their sum
/// does not exceed `available_width`.
pub fn compute_column_widths(rows: &[Vec<String>], available_width: f32) -> ColumnWidths {
    let mut widths = natural_column_widths(rows);
    let available = available_width.max(0.0);
    let total: f32 = widths.iter().sum();

    if total > available {
        let factor = available / total;
        for width in &mut widths {
            *width *= factor;
        }
    }

    ColumnWidths::new(widths)
}

/// Shorten `text` with a ".." suffix until it fits `width`.
///
/// Character advances are summed once, left to right, and the cut falls after
/// the last character whose running width still leaves room for the suffix.
/// Returns an empty string when not even the suffix fits.
pub fn fit_cell(text: &str, width: f32, font_size: f32, measure: &dyn TextMeasure) -> String {
    if measure.width(text, font_size) <= width {
        return text.to_string();
    }

    let budget = width - measure.width(TRUNCATION_SUFFIX, font_size);
    if budget < 0.0 {
        return String::new();
    }

    let mut used = 0.0;
    let mut cut = 0;
    let mut utf8 = [0u8; 4];
    for (offset, ch) in text.char_indices() {
        used += measure.width(ch.encode_utf8(&mut utf8), font_size);
        if used > budget {
            break;
        }
        cut = offset + ch.len_utf8();
    }

    format!("{}{TRUNCATION_SUFFIX}", &text[..cut])
}

/// Lays sheets out as rows of cells, one sheet after another.
pub struct TableLayout<'m> {
    geometry: PageGeometry,
    font_size: f32,
    measure: &'m dyn TextMeasure,
}

impl<'m> TableLayout<'m> {
    pub fn new(geometry: PageGeometry, font_size: f32, measure: &'m dyn TextMeasure) -> Self {
        Self {
            geometry,
            font_size,
            measure,
        }
    }

    /// Each sheet starts on a fresh page, headed by its name.
    #[instrument(skip_all, fields(sheets = sheets.len()))]
    pub fn layout_sheets(&self, sheets: &[Sheet]) -> Result<Vec<Vec<DrawInstruction>>> {
        self.geometry.validate(self.font_size)?;

        let mut pages = Paginator::new(self.geometry, self.font_size * LINE_HEIGHT_FACTOR);
        for sheet in sheets {
            if !pages.page_is_empty() {
                pages.break_page();
            }
            self.layout_sheet(&mut pages, sheet);
        }

        Ok(pages.finish())
    }

    fn layout_sheet(&self, pages: &mut Paginator, sheet: &Sheet) {
        let margin = self.geometry.margin;

        if !sheet.name.trim().is_empty() {
            pages.ensure_room();
            pages.place(sheet.name.clone(), margin, self.font_size);
            pages.next_line();
        }

        let widths = compute_column_widths(&sheet.rows, self.geometry.usable_width());
        debug!(
            sheet = %sheet.name,
            rows = sheet.rows.len(),
            columns = widths.len(),
            "Column widths frozen"
        );

        for row in &sheet.rows {
            pages.ensure_room();
            let mut x = margin;
            for (cell, width) in row.iter().zip(widths.as_slice()) {
                let text = fit_cell(cell.trim(), *width, self.font_size, self.measure);
                if !text.is_empty() {
                    pages.place(text, x, self.font_size);
                }
                x += width;
            }
            pages.next_line();
        }
    }
}
