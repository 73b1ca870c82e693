// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page geometry, the layout cursor, and the page-break guard shared by the
// text and table typesetters.

use quire_core::TypesettingConfig;
use quire_core::error::{QuireError, Result};
use quire_core::types::DrawInstruction;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Output page size and uniform margin, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
        }
    }

    pub fn from_config(config: &TypesettingConfig) -> Self {
        let (width, height) = config.paper_size.dimensions_pt();
        Self::new(width, height, config.margin_pt)
    }

    pub fn usable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    /// Baseline of the first line on a fresh page.
    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    /// Number of lines of `line_height` that fit between the margins.
    pub fn lines_per_page(&self, line_height: f32) -> usize {
        ((self.height - 2.0 * self.margin) / line_height).floor().max(0.0) as usize
    }

    /// Reject geometry that cannot hold a single line of text.
    pub fn validate(&self, font_size: f32) -> Result<()> {
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(QuireError::Layout(format!("invalid font size {font_size}")));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(QuireError::Layout(format!("invalid margin {}", self.margin)));
        }
        if self.usable_width() <= 0.0 {
            return Err(QuireError::Layout(format!(
                "margins of {}pt leave no width on a {}pt page",
                self.margin, self.width
            )));
        }
        if self.height < 2.0 * self.margin + line_height {
            return Err(QuireError::Layout(format!(
                "a {}pt page cannot hold one {line_height}pt line inside {}pt margins",
                self.height, self.margin
            )));
        }
        Ok(())
    }
}

/// Position of the next line. `y` only decreases until a page break resets
/// it; `page_index` only increases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub x: f32,
    pub y: f32,
    pub page_index: usize,
}

/// Collects draw instructions into pages, breaking when the cursor runs out
/// of room.
#[derive(Debug)]
pub(crate) struct Paginator {
    geometry: PageGeometry,
    line_height: f32,
    cursor: LayoutCursor,
    pages: Vec<Vec<DrawInstruction>>,
}

impl Paginator {
    pub(crate) fn new(geometry: PageGeometry, line_height: f32) -> Self {
        Self {
            geometry,
            line_height,
            cursor: LayoutCursor {
                x: geometry.margin,
                y: geometry.top(),
                page_index: 0,
            },
            pages: vec![Vec::new()],
        }
    }

    pub(crate) fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    /// Break to a new page if the next line would cross the bottom margin.
    pub(crate) fn ensure_room(&mut self) {
        if self.cursor.y < self.geometry.margin + self.line_height {
            self.break_page();
        }
    }

    /// Start a fresh page and reset the cursor to the top margin.
    pub(crate) fn break_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor.page_index += 1;
        self.cursor.y = self.geometry.top();
        self.cursor.x = self.geometry.margin;
    }

    /// True when nothing has been drawn on the current page yet.
    pub(crate) fn page_is_empty(&self) -> bool {
        self.pages.last().is_none_or(|page| page.is_empty())
    }

    /// Place `text` at `x` on the current line without moving down.
    pub(crate) fn place(&mut self, text: String, x: f32, font_size: f32) {
        let instruction = DrawInstruction {
            text,
            x,
            y: self.cursor.y,
            font_size,
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(instruction);
        }
    }

    /// Move the cursor down by `dy`.
    pub(crate) fn advance(&mut self, dy: f32) {
        self.cursor.y -= dy;
    }

    /// Move down one full line.
    pub(crate) fn next_line(&mut self) {
        self.advance(self.line_height);
    }

    pub(crate) fn finish(self) -> Vec<Vec<DrawInstruction>> {
        self.pages
    }
}
