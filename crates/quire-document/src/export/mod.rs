// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serializers from a reconstructed document to output bytes. Word-processor,
// slide, and spreadsheet writers live outside this crate and plug in through
// [`DocumentWriter`].

pub mod html;
pub mod text;

use quire_core::error::Result;
use quire_core::types::Document;

pub use html::HtmlWriter;
pub use text::PlainTextWriter;

/// A per-format writer for reconstructed documents.
pub trait DocumentWriter {
    /// MIME type of the produced bytes.
    fn mime_type(&self) -> &'static str;

    fn write(&self, document: &Document) -> Result<Vec<u8>>;
}

/// Split recognised text into blocks separated by blank lines.
pub(crate) fn blank_line_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_split_on_blank_lines() {
        let blocks = blank_line_blocks("one\ntwo\n\n  \nthree\n");
        assert_eq!(blocks, vec!["one\ntwo".to_string(), "three".to_string()]);
    }

    #[test]
    fn no_blocks_in_blank_text() {
        assert!(blank_line_blocks("\n\n").is_empty());
    }
}
