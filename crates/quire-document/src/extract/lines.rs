// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line assembly: cluster positioned fragments into reading-order lines.

use quire_core::types::{Line, TextFragment};

/// Default maximum baseline distance, in layout units.
pub const DEFAULT_LINE_THRESHOLD: f32 = 5.0;

/// Groups a page's fragments into lines by baseline proximity.
///
/// Fragments are consumed in extractor order. A line's bucket is anchored on
/// the baseline of its first fragment and never drifts, so slowly creeping
/// baselines along one visual line cannot merge into the next.
#[derive(Debug, Clone, Copy)]
pub struct LineAssembler {
    threshold: f32,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_THRESHOLD)
    }
}

impl LineAssembler {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn assemble(&self, fragments: Vec<TextFragment>) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut iter = fragments.into_iter();

        let Some(first) = iter.next() else {
            return lines;
        };
        let mut bucket = first.y_baseline;
        let mut current = vec![first];

        for fragment in iter {
            if (fragment.y_baseline - bucket).abs() > self.threshold {
                lines.push(close_line(bucket, std::mem::take(&mut current)));
                bucket = fragment.y_baseline;
            }
            current.push(fragment);
        }

        lines.push(close_line(bucket, current));
        lines
    }
}

/// Build a [`Line`] with its fragments sorted left to right.
fn close_line(y_bucket: f32, mut fragments: Vec<TextFragment>) -> Line {
    fragments.sort_by(|a, b| a.x.total_cmp(&b.x));
    Line {
        y_bucket,
        fragments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y, 0)
    }

    #[test]
    fn baselines_within_threshold_share_a_line() {
        let fragments = vec![
            frag("a", 10.0, 100.0),
            frag("b", 20.0, 101.0),
            frag("c", 30.0, 102.0),
            frag("d", 10.0, 50.0),
        ];
        let lines = LineAssembler::default().assemble(fragments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].y_bucket, 100.0);
        assert_eq!(lines[0].text(), "a b c");
        assert_eq!(lines[1].y_bucket, 50.0);
        assert_eq!(lines[1].text(), "d");
    }

    #[test]
    fn anchor_does_not_drift() {
        // Each step is within 5 of the previous fragment, but the fourth is
        // 6 away from the first, so it starts a new line.
        let fragments = vec![
            frag("a", 0.0, 100.0),
            frag("b", 10.0, 98.0),
            frag("c", 20.0, 96.0),
            frag("d", 30.0, 94.0),
        ];
        let lines = LineAssembler::default().assemble(fragments);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "a b c");
        assert_eq!(lines[1].y_bucket, 94.0);
    }

    #[test]
    fn exactly_threshold_stays_on_line() {
        let lines =
            LineAssembler::default().assemble(vec![frag("a", 0.0, 100.0), frag("b", 5.0, 95.0)]);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn fragments_sorted_by_x_within_line() {
        let fragments = vec![
            frag("world", 80.0, 700.0),
            frag("Hello", 20.0, 700.5),
            frag("!", 120.0, 699.0),
        ];
        let lines = LineAssembler::default().assemble(fragments);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), "Hello world !");
    }

    #[test]
    fn empty_input_gives_no_lines() {
        assert!(LineAssembler::default().assemble(Vec::new()).is_empty());
    }

    #[test]
    fn custom_threshold() {
        let fragments = vec![frag("a", 0.0, 100.0), frag("b", 0.0, 92.0)];
        assert_eq!(LineAssembler::new(10.0).assemble(fragments.clone()).len(), 1);
        assert_eq!(LineAssembler::new(5.0).assemble(fragments).len(), 2);
    }
}
