// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction direction: PDF pages to a reconstructed document, using the text
// layer where it is usable and optical recognition where it is not.

pub mod classifier;
pub mod engine;
pub mod lines;
pub mod paragraphs;
pub mod pipeline;
pub mod progress;

pub use classifier::PageClassifier;
pub use engine::{
    CancellationToken, PageSource, ProgressSender, RecognitionProgress, TextRecognizer,
    UnavailableRecognizer,
};
pub use lines::LineAssembler;
pub use paragraphs::{DocumentBuilder, ParagraphReconstructor};
pub use pipeline::{ExtractionRun, Extractor, ReconstructedPage};
pub use progress::{ProgressAggregator, ProgressUpdate};
