// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: each page of draw instructions becomes one `printpdf` page
// whose op list is a run of text sections in builtin Helvetica.

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use quire_core::PaperSize;
use quire_core::error::Result;
use quire_core::types::DrawInstruction;
use tracing::{debug, info, instrument};

/// Turns per-page draw instructions into PDF bytes with the built-in
/// Helvetica font.
pub struct PdfWriter {
    paper_size: PaperSize,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfWriter {
    pub fn new(paper_size: PaperSize) -> Self {
        Self {
            paper_size,
            title: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Paper dimensions in printpdf's Mm units.
    fn page_dimensions(&self) -> (Mm, Mm) {
        let (w_mm, h_mm) = self.paper_size.dimensions_mm();
        (Mm(w_mm as f32), Mm(h_mm as f32))
    }

    /// One PDF page per instruction list. Coordinates are points from the
    /// bottom-left corner. An empty slice still produces one blank page.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn render(&self, pages: &[Vec<DrawInstruction>]) -> Result<Vec<u8>> {
        let (page_w, page_h) = self.page_dimensions();
        let title = self.title.as_deref().unwrap_or("Quire Document");

        info!(paper = ?self.paper_size, title, "Writing PDF");

        let mut pdf_pages: Vec<PdfPage> = pages
            .iter()
            .map(|instructions| PdfPage::new(page_w, page_h, page_ops(instructions)))
            .collect();
        if pdf_pages.is_empty() {
            pdf_pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        let mut doc = PdfDocument::new(title);
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        debug!(
            output_bytes = output.len(),
            warnings = warnings.len(),
            "PDF serialised"
        );
        Ok(output)
    }
}

fn page_ops(instructions: &[DrawInstruction]) -> Vec<Op> {
    let mut ops: Vec<Op> = Vec::with_capacity(instructions.len() * 5);
    for instruction in instructions {
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(instruction.x),
                y: Pt(instruction.y),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(instruction.font_size),
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(instruction.text.clone())],
            font: BuiltinFont::Helvetica,
        });
        ops.push(Op::EndTextSection);
    }
    ops
}
