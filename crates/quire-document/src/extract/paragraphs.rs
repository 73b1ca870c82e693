// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paragraph reconstruction: lines → paragraphs, pages → document.

use quire_core::types::{Document, Page, PageContent, PageStrategy, Paragraph, RunSummary};
use tracing::debug;

use super::lines::LineAssembler;

/// Turns one page at a time into paragraphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphReconstructor {
    lines: LineAssembler,
}

impl ParagraphReconstructor {
    pub fn new(lines: LineAssembler) -> Self {
        Self { lines }
    }

    /// Native pages give one paragraph per line; a recognised page gives a
    /// single paragraph holding the engine's text verbatim.
    pub fn reconstruct(&self, page: Page) -> Vec<Paragraph> {
        let page_index = page.index;
        match page.content {
            PageContent::NativeText(fragments) => {
                let paragraphs: Vec<Paragraph> = self
                    .lines
                    .assemble(fragments)
                    .into_iter()
                    .map(|line| line.text())
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| Paragraph {
                        page_index,
                        text,
                        strategy: PageStrategy::NativeText,
                    })
                    .collect();
                debug!(page = page_index, paragraphs = paragraphs.len(), "Native page reconstructed");
                paragraphs
            }
            PageContent::Recognized(text) => {
                if text.trim().is_empty() {
                    return Vec::new();
                }
                vec![Paragraph {
                    page_index,
                    text,
                    strategy: PageStrategy::Recognized,
                }]
            }
        }
    }
}

/// Accumulates reconstructed pages in source order.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    page_count: usize,
    paragraphs: Vec<Paragraph>,
    summary: RunSummary,
}

impl DocumentBuilder {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            ..Self::default()
        }
    }

    pub fn push_page(&mut self, strategy: PageStrategy, paragraphs: Vec<Paragraph>) {
        match strategy {
            PageStrategy::NativeText => self.summary.native_pages += 1,
            PageStrategy::Recognized => self.summary.recognized_pages += 1,
        }
        self.paragraphs.extend(paragraphs);
    }

    pub fn record_text_layer_failure(&mut self) {
        self.summary.text_layer_failures += 1;
    }

    pub fn finish(self) -> Document {
        Document {
            page_count: self.page_count,
            paragraphs: self.paragraphs,
            summary: self.summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_core::types::TextFragment;

    #[test]
    fn native_page_yields_one_paragraph_per_line() {
        let page = Page::native(
            2,
            vec![
                TextFragment::new("Title", 72.0, 760.0, 2),
                TextFragment::new("Body", 72.0, 730.0, 2),
                TextFragment::new("text", 110.0, 731.0, 2),
            ],
        );
        let paragraphs = ParagraphReconstructor::default().reconstruct(page);
        let texts: Vec<&str> = paragraphs.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Body text"]);
        assert!(paragraphs.iter().all(|p| p.page_index == 2));
    }

    #[test]
    fn whitespace_only_lines_are_dropped() {
        let page = Page::native(
            0,
            vec![
                TextFragment::new(" ", 72.0, 760.0, 0),
                TextFragment::new("Body", 72.0, 730.0, 0),
            ],
        );
        let paragraphs = ParagraphReconstructor::default().reconstruct(page);
        assert_eq!(paragraphs.len(), 1);
    }

    #[test]
    fn recognized_text_is_kept_verbatim() {
        let text = "First line\nSecond line\n\nNext block";
        let paragraphs = ParagraphReconstructor::default().reconstruct(Page::recognized(0, text));
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].text, text);
        assert_eq!(paragraphs[0].strategy, PageStrategy::Recognized);
    }

    #[test]
    fn blank_recognition_gives_no_paragraph() {
        let paragraphs = ParagraphReconstructor::default().reconstruct(Page::recognized(0, "\n  \n"));
        assert!(paragraphs.is_empty());
    }

    #[test]
    fn builder_keeps_page_order_and_counts() {
        let reconstructor = ParagraphReconstructor::default();
        let mut builder = DocumentBuilder::new(2);
        builder.push_page(
            PageStrategy::Recognized,
            reconstructor.reconstruct(Page::recognized(0, "scan")),
        );
        builder.push_page(
            PageStrategy::NativeText,
            reconstructor.reconstruct(Page::native(
                1,
                vec![TextFragment::new("typed", 0.0, 10.0, 1)],
            )),
        );
        builder.record_text_layer_failure();
        let document = builder.finish();
        assert_eq!(document.page_count, 2);
        assert_eq!(document.paragraphs[0].page_index, 0);
        assert_eq!(document.paragraphs[1].page_index, 1);
        assert_eq!(document.summary.native_pages, 1);
        assert_eq!(document.summary.recognized_pages, 1);
        assert_eq!(document.summary.text_layer_failures, 1);
    }
}
