// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Greedy word-wrap and pagination of plain text.

use quire_core::error::Result;
use quire_core::types::DrawInstruction;
use tracing::{debug, instrument};

use super::cursor::{LINE_HEIGHT_FACTOR, PageGeometry, Paginator};
use super::metrics::TextMeasure;

/// Lays text into fixed-size pages.
///
/// Logical lines are split on `\n` and words are packed greedily while the
/// measured line fits the usable width. A word that is wider than the usable
/// width on its own is placed as-is and allowed to overflow. Blank logical
/// lines add half a line of vertical space.
pub struct Typesetter<'m> {
    geometry: PageGeometry,
    font_size: f32,
    measure: &'m dyn TextMeasure,
}

impl<'m> Typesetter<'m> {
    pub fn new(geometry: PageGeometry, font_size: f32, measure: &'m dyn TextMeasure) -> Self {
        Self {
            geometry,
            font_size,
            measure,
        }
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_FACTOR
    }

    /// One instruction list per output page. Empty text gives one blank page.
    #[instrument(skip_all, fields(text_len = text.len(), font_size = self.font_size))]
    pub fn layout(&self, text: &str) -> Result<Vec<Vec<DrawInstruction>>> {
        self.geometry.validate(self.font_size)?;

        let usable_width = self.geometry.usable_width();
        let line_height = self.line_height();
        let mut pages = Paginator::new(self.geometry, line_height);
        let mut emitted = 0usize;

        for logical_line in text.split('\n') {
            let mut words = logical_line.split_whitespace();
            let Some(first) = words.next() else {
                pages.advance(line_height / 2.0);
                continue;
            };

            let mut candidate = first.to_string();
            for word in words {
                let trial = format!("{candidate} {word}");
                if self.measure.width(&trial, self.font_size) <= usable_width {
                    candidate = trial;
                } else {
                    self.emit(&mut pages, std::mem::replace(&mut candidate, word.to_string()));
                    emitted += 1;
                }
            }
            self.emit(&mut pages, candidate);
            emitted += 1;
        }

        let pages = pages.finish();
        debug!(lines = emitted, pages = pages.len(), "Text layout complete");
        Ok(pages)
    }

    fn emit(&self, pages: &mut Paginator, line: String) {
        pages.ensure_room();
        pages.place(line, self.geometry.margin, self.font_size);
        pages.next_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::{Helvetica, Monospace};
    use proptest::prelude::*;

    fn texts(pages: &[Vec<DrawInstruction>]) -> Vec<Vec<&str>> {
        pages
            .iter()
            .map(|page| page.iter().map(|i| i.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn wraps_after_two_words() {
        // 5pt per character, 50pt usable: "aaaa bbbb" (45pt) fits, a third word does not.
        let mono = Monospace { advance: 0.5 };
        let typesetter = Typesetter::new(PageGeometry::new(150.0, 400.0, 50.0), 10.0, &mono);
        let pages = typesetter.layout("aaaa bbbb cccc").expect("layout");
        assert_eq!(texts(&pages), vec![vec!["aaaa bbbb", "cccc"]]);
    }

    #[test]
    fn lines_step_down_from_top_margin() {
        let mono = Monospace { advance: 0.5 };
        let typesetter = Typesetter::new(PageGeometry::new(150.0, 400.0, 50.0), 10.0, &mono);
        let pages = typesetter.layout("aaaa bbbb cccc").expect("layout");
        assert_eq!(pages[0][0].x, 50.0);
        assert_eq!(pages[0][0].y, 350.0);
        assert_eq!(pages[0][1].y, 336.0);
        assert_eq!(pages[0][1].font_size, 10.0);
    }

    #[test]
    fn short_sentence_is_never_broken() {
        let sentence = "A sentence that measures well under five hundred points.";
        assert!(Helvetica.width(sentence, 12.0) <= 500.0);
        let typesetter = Typesetter::new(PageGeometry::new(600.0, 800.0, 50.0), 12.0, &Helvetica);
        let pages = typesetter.layout(sentence).expect("layout");
        assert_eq!(texts(&pages), vec![vec![sentence]]);
    }

    #[test]
    fn oversized_word_overflows_unsplit() {
        let mono = Monospace { advance: 0.5 };
        let typesetter = Typesetter::new(PageGeometry::new(150.0, 400.0, 50.0), 10.0, &mono);
        let long = "x".repeat(30);
        let pages = typesetter.layout(&format!("ab {long} cd")).expect("layout");
        assert_eq!(texts(&pages), vec![vec!["ab", long.as_str(), "cd"]]);
    }

    #[test]
    fn blank_line_adds_half_line_gap() {
        let mono = Monospace { advance: 0.5 };
        let typesetter = Typesetter::new(PageGeometry::new(150.0, 400.0, 50.0), 10.0, &mono);
        let pages = typesetter.layout("one\n\ntwo").expect("layout");
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[0][0].y, 350.0);
        assert_eq!(pages[0][1].y, 350.0 - 14.0 - 7.0);
    }

    #[test]
    fn empty_text_is_one_blank_page() {
        let typesetter = Typesetter::new(PageGeometry::new(600.0, 800.0, 50.0), 12.0, &Helvetica);
        let pages = typesetter.layout("").expect("layout");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn impossible_geometry_is_a_layout_error() {
        let typesetter = Typesetter::new(PageGeometry::new(90.0, 800.0, 50.0), 12.0, &Helvetica);
        let err = typesetter.layout("text").expect_err("must fail");
        assert!(matches!(err, quire_core::QuireError::Layout(_)));
    }

    #[test]
    fn page_count_is_ceiling_of_lines_over_capacity() {
        let geometry = PageGeometry::new(600.0, 600.0, 50.0);
        let typesetter = Typesetter::new(geometry, 10.0, &Helvetica);
        let capacity = geometry.lines_per_page(typesetter.line_height());
        assert_eq!(capacity, 35);

        for lines in [1usize, 34, 35, 36, 70, 71, 200] {
            let text = vec!["word"; lines].join("\n");
            let pages = typesetter.layout(&text).expect("layout");
            assert_eq!(pages.len(), lines.div_ceil(capacity), "{lines} lines");
            assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), lines);
        }
    }

    proptest! {
        #[test]
        fn pages_equal_ceil_n_over_c(lines in 1usize..300, size_step in 1u32..5) {
            let font_size = size_step as f32 * 5.0;
            let geometry = PageGeometry::new(600.0, 800.0, 50.0);
            let typesetter = Typesetter::new(geometry, font_size, &Helvetica);
            let capacity = geometry.lines_per_page(typesetter.line_height());
            let text = vec!["w"; lines].join("\n");
            let pages = typesetter.layout(&text).expect("layout");
            prop_assert_eq!(pages.len(), lines.div_ceil(capacity));
        }

        #[test]
        fn cursor_descends_within_each_page(words in proptest::collection::vec("[a-z]{1,12}", 0..400)) {
            let geometry = PageGeometry::new(300.0, 400.0, 40.0);
            let typesetter = Typesetter::new(geometry, 11.0, &Helvetica);
            let pages = typesetter.layout(&words.join(" ")).expect("layout");
            for page in &pages {
                prop_assert!(page.windows(2).all(|pair| pair[1].y < pair[0].y));
                prop_assert!(page.iter().all(|line| line.y >= geometry.margin));
            }
        }
    }
}
