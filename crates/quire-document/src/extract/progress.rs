// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Run-level progress: merges per-page fractions into one 0–100 value.

use quire_core::types::PageStrategy;

/// One notification sent to a run's progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub page_index: usize,
    pub page_count: usize,
    pub strategy: PageStrategy,
    pub percent: u8,
}

/// Monotonic percentage over a whole run.
///
/// `percent = round((page_index + fraction) / page_count * 100)`, never lower
/// than any value returned earlier in the same run.
#[derive(Debug, Default)]
pub struct ProgressAggregator {
    last: u8,
}

impl ProgressAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, page_index: usize, page_count: usize, fraction: f32) -> u8 {
        let percent = if page_count == 0 {
            100
        } else {
            let fraction = if fraction.is_finite() {
                fraction.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let overall = (page_index as f64 + fraction as f64) / page_count as f64;
            (overall * 100.0).round().clamp(0.0, 100.0) as u8
        };
        self.last = self.last.max(percent);
        self.last
    }

    /// Native pages carry no incremental signal: they complete at once.
    pub fn complete_page(&mut self, page_index: usize, page_count: usize) -> u8 {
        self.update(page_index, page_count, 1.0)
    }

    pub fn current(&self) -> u8 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formula_matches_page_share() {
        let mut progress = ProgressAggregator::new();
        assert_eq!(progress.update(0, 4, 0.5), 13);
        assert_eq!(progress.update(1, 4, 0.0), 25);
        assert_eq!(progress.complete_page(3, 4), 100);
    }

    #[test]
    fn never_goes_backwards() {
        let mut progress = ProgressAggregator::new();
        assert_eq!(progress.update(1, 2, 0.8), 90);
        assert_eq!(progress.update(1, 2, 0.2), 90);
        assert_eq!(progress.current(), 90);
    }

    #[test]
    fn empty_document_is_complete() {
        assert_eq!(ProgressAggregator::new().update(0, 0, 0.0), 100);
    }

    #[test]
    fn junk_fractions_are_contained() {
        let mut progress = ProgressAggregator::new();
        assert_eq!(progress.update(0, 1, f32::NAN), 0);
        assert_eq!(progress.update(0, 1, 7.0), 100);
    }

    proptest! {
        #[test]
        fn monotonic_and_ends_at_100(
            page_count in 1usize..40,
            steps in proptest::collection::vec(0.0f32..=1.0, 1..6),
        ) {
            let mut progress = ProgressAggregator::new();
            let mut previous = 0u8;
            for page in 0..page_count {
                let mut sorted = steps.clone();
                sorted.sort_by(|a, b| a.total_cmp(b));
                for fraction in sorted {
                    let percent = progress.update(page, page_count, fraction);
                    prop_assert!(percent >= previous);
                    previous = percent;
                }
                let percent = progress.complete_page(page, page_count);
                prop_assert!(percent >= previous);
                previous = percent;
            }
            prop_assert_eq!(previous, 100);
        }
    }
}
