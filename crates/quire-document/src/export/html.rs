// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML serializer. One `<section>` per source page; recognised text is split
// into `<p>` blocks on blank lines with `<br>` for the remaining line breaks.

use quire_core::error::Result;
use quire_core::types::{Document, PageStrategy};

use super::{DocumentWriter, blank_line_blocks};

#[derive(Debug, Clone)]
pub struct HtmlWriter {
    title: String,
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new("Converted document")
    }
}

impl HtmlWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn render(&self, document: &Document) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape(&self.title)));
        out.push_str("</head>\n<body>\n");

        for page_index in 0..document.page_count {
            out.push_str(&format!(
                "<section class=\"page\" data-page=\"{}\">\n",
                page_index + 1
            ));
            for paragraph in document.page_paragraphs(page_index) {
                match paragraph.strategy {
                    PageStrategy::NativeText => {
                        out.push_str(&format!("<p>{}</p>\n", escape(&paragraph.text)));
                    }
                    PageStrategy::Recognized => {
                        for block in blank_line_blocks(&paragraph.text) {
                            let lines: Vec<String> = block.lines().map(escape).collect();
                            out.push_str(&format!("<p>{}</p>\n", lines.join("<br>")));
                        }
                    }
                }
            }
            out.push_str("</section>\n");
        }

        out.push_str("</body>\n</html>\n");
        out
    }
}

impl DocumentWriter for HtmlWriter {
    fn mime_type(&self) -> &'static str {
        "text/html"
    }

    fn write(&self, document: &Document) -> Result<Vec<u8>> {
        Ok(self.render(document).into_bytes())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::types::Paragraph;

    #[test]
    fn text_is_escaped() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn recognised_blocks_become_paragraphs() {
        let document = Document {
            page_count: 1,
            paragraphs: vec![Paragraph {
                page_index: 0,
                text: "Line one\nLine two\n\nNext".into(),
                strategy: PageStrategy::Recognized,
            }],
            ..Document::default()
        };
        let html = HtmlWriter::new("Scan").render(&document);
        assert!(html.contains("<title>Scan</title>"));
        assert!(html.contains("<p>Line one<br>Line two</p>\n<p>Next</p>"));
        assert_eq!(html.matches("<section").count(), 1);
    }

    #[test]
    fn native_lines_are_single_paragraphs() {
        let document = Document {
            page_count: 2,
            paragraphs: vec![
                Paragraph {
                    page_index: 0,
                    text: "Q&A".into(),
                    strategy: PageStrategy::NativeText,
                },
                Paragraph {
                    page_index: 1,
                    text: "Second".into(),
                    strategy: PageStrategy::NativeText,
                },
            ],
            ..Document::default()
        };
        let html = HtmlWriter::default().render(&document);
        assert!(html.contains("<section class=\"page\" data-page=\"1\">\n<p>Q&amp;A</p>"));
        assert!(html.contains("data-page=\"2\">\n<p>Second</p>"));
    }
}
