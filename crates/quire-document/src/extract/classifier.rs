// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-page strategy decision: trust the text layer or fall back to OCR.
//
// The decision is a length heuristic, not a content probe. Pages made mostly
// of short numeric cells can fall under the threshold and be sent to
// recognition even though their text layer is genuine.

use quire_core::types::{PageStrategy, TextFragment};

/// Default minimum number of trimmed characters for a usable text layer.
pub const DEFAULT_MIN_CHARS: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct PageClassifier {
    min_chars: usize,
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CHARS)
    }
}

impl PageClassifier {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// `NativeText` when the trimmed text has at least `min_chars` characters.
    pub fn classify(&self, native_text: &str) -> PageStrategy {
        if native_text.trim().chars().count() >= self.min_chars {
            PageStrategy::NativeText
        } else {
            PageStrategy::Recognized
        }
    }

    pub fn classify_fragments(&self, fragments: &[TextFragment]) -> PageStrategy {
        self.classify(&native_text(fragments))
    }
}

/// Page text as the classifier sees it: fragment texts joined by spaces.
pub fn native_text(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
