// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Seams to the external collaborators of an extraction run: the PDF
// parse/render engine and the recognition engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use quire_core::error::{QuireError, Result};
use quire_core::types::{PixelBuffer, TextFragment};

/// A loaded PDF document. Dropping it releases the engine's resources.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Positioned text items for one page, in content-stream order.
    fn text_content(&self, page_index: usize) -> Result<Vec<TextFragment>>;

    /// Rasterise one page at `scale` times its 72 dpi size.
    fn render(&self, page_index: usize, scale: f32) -> Result<PixelBuffer>;

    /// Whether `render` would draw any page content. A source that cannot
    /// rasterise vector graphics answers `false` for pages whose only ink is
    /// vector, so their text layer is kept rather than recognising a blank
    /// canvas.
    fn has_raster_content(&self, _page_index: usize) -> Result<bool> {
        Ok(true)
    }
}

/// Fractional completion of the recognition job for the current page, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionProgress(pub f32);

/// Sending half of a page's recognition progress channel.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<RecognitionProgress>,
}

impl ProgressSender {
    pub fn channel() -> (Self, mpsc::Receiver<RecognitionProgress>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Report progress. A receiver that has gone away is ignored.
    pub fn report(&self, fraction: f32) {
        let _ = self.tx.send(RecognitionProgress(fraction.clamp(0.0, 1.0)));
    }
}

/// Image-to-text engine. Called from a worker thread, one page at a time.
pub trait TextRecognizer: Send + Sync {
    fn recognize(
        &self,
        image: &PixelBuffer,
        language: &str,
        progress: &ProgressSender,
    ) -> Result<String>;
}

/// Recognizer for builds without an OCR engine. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRecognizer;

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _: &PixelBuffer, _: &str, _: &ProgressSender) -> Result<String> {
        Err(QuireError::Recognition(
            "this build has no recognition engine (enable the `ocr` feature)".into(),
        ))
    }
}

/// Cooperative cancellation flag, checked between pages.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
