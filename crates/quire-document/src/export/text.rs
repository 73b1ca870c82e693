// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text serializer.

use quire_core::error::Result;
use quire_core::types::Document;

use super::DocumentWriter;

/// Writes paragraphs one per line, each page introduced by `--- Page N ---`.
#[derive(Debug, Clone, Copy)]
pub struct PlainTextWriter {
    pub page_markers: bool,
}

impl Default for PlainTextWriter {
    fn default() -> Self {
        Self { page_markers: true }
    }
}

impl PlainTextWriter {
    pub fn new(page_markers: bool) -> Self {
        Self { page_markers }
    }

    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();

        for page_index in 0..document.page_count {
            if page_index > 0 {
                out.push('\n');
            }
            if self.page_markers {
                out.push_str(&format!("--- Page {} ---\n", page_index + 1));
            }
            for paragraph in document.page_paragraphs(page_index) {
                out.push_str(paragraph.text.trim_end());
                out.push('\n');
            }
        }

        out
    }
}

impl DocumentWriter for PlainTextWriter {
    fn mime_type(&self) -> &'static str {
        "text/plain"
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>> {
        Ok(self.render(document).into_bytes())
    }
}
