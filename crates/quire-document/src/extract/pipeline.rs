// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction run orchestration.
//
// Pages are processed strictly one after another: classify, then either take
// the text layer or rasterise and recognise, then rebuild paragraphs. A sparse
// page the source cannot draw keeps its text layer. At most
// one raster buffer and one recognition job exist at any time. The first
// render or recognition failure ends the run and nothing is kept.

use std::sync::mpsc;

use quire_core::EngineConfig;
use quire_core::error::{QuireError, Result};
use quire_core::types::{Document, Page, PageStrategy, Paragraph, RunId};
use tracing::{debug, info, info_span, warn};

use super::classifier::PageClassifier;
use super::engine::{
    CancellationToken, PageSource, ProgressSender, RecognitionProgress, TextRecognizer,
};
use super::lines::LineAssembler;
use super::paragraphs::{DocumentBuilder, ParagraphReconstructor};
use super::progress::{ProgressAggregator, ProgressUpdate};

/// One page of output, yielded by [`ExtractionRun`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedPage {
    pub index: usize,
    pub strategy: PageStrategy,
    pub paragraphs: Vec<Paragraph>,
    /// The text layer could not be read and the page was recognised instead.
    pub text_layer_failed: bool,
}

/// Configured extraction orchestrator. Cheap to build, reusable across runs.
pub struct Extractor<'r> {
    config: EngineConfig,
    classifier: PageClassifier,
    reconstructor: ParagraphReconstructor,
    recognizer: &'r dyn TextRecognizer,
    cancel: CancellationToken,
    sink: Option<mpsc::Sender<ProgressUpdate>>,
}

impl<'r> Extractor<'r> {
    pub fn new(config: EngineConfig, recognizer: &'r dyn TextRecognizer) -> Self {
        let classifier = PageClassifier::new(config.native_text_min_chars);
        let reconstructor = ParagraphReconstructor::new(LineAssembler::new(config.line_threshold));
        Self {
            config,
            classifier,
            reconstructor,
            recognizer,
            cancel: CancellationToken::new(),
            sink: None,
        }
    }

    /// Check `token` before every page.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Send every progress change to `sink`.
    pub fn with_progress(mut self, sink: mpsc::Sender<ProgressUpdate>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a run over `source`. Each call to `next()` processes one page.
    pub fn pages<'a>(&'a self, source: &'a dyn PageSource) -> ExtractionRun<'a, 'r> {
        let run_id = RunId::new();
        let page_count = source.page_count();
        info!(run = %run_id, page_count, "Starting extraction run");
        ExtractionRun {
            extractor: self,
            source,
            run_id,
            page_count,
            next_page: 0,
            progress: ProgressAggregator::new(),
            finished: false,
        }
    }

    /// Process every page and build the document, or fail with the first error.
    pub fn extract(&self, source: &dyn PageSource) -> Result<Document> {
        let mut run = self.pages(source);
        let mut builder = DocumentBuilder::new(run.page_count);

        for page in &mut run {
            let page = page?;
            if page.text_layer_failed {
                builder.record_text_layer_failure();
            }
            builder.push_page(page.strategy, page.paragraphs);
        }

        let document = builder.finish();
        info!(
            run = %run.run_id,
            native = document.summary.native_pages,
            recognized = document.summary.recognized_pages,
            paragraphs = document.paragraphs.len(),
            "Extraction run complete"
        );
        Ok(document)
    }

    fn emit(&self, update: ProgressUpdate) {
        if let Some(sink) = &self.sink {
            // The consumer may have stopped listening; the run carries on.
            let _ = sink.send(update);
        }
    }
}

/// A run in progress: an iterator of reconstructed pages in source order.
///
/// After an error (or cancellation) the iterator is exhausted.
pub struct ExtractionRun<'a, 'r> {
    extractor: &'a Extractor<'r>,
    source: &'a dyn PageSource,
    run_id: RunId,
    page_count: usize,
    next_page: usize,
    progress: ProgressAggregator,
    finished: bool,
}

impl ExtractionRun<'_, '_> {
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Latest overall percentage.
    pub fn percent(&self) -> u8 {
        self.progress.current()
    }

    fn process_page(&mut self, index: usize) -> Result<ReconstructedPage> {
        let extractor = self.extractor;

        let (page, text_layer_failed) = match self.source.text_content(index) {
            Ok(fragments) => match extractor.classifier.classify_fragments(&fragments) {
                PageStrategy::NativeText => (Page::native(index, fragments), false),
                PageStrategy::Recognized => {
                    if self.source.has_raster_content(index)? {
                        debug!(fragments = fragments.len(), "Text layer too sparse");
                        (self.recognize_page(index)?, false)
                    } else {
                        warn!(
                            fragments = fragments.len(),
                            "Sparse page has nothing to rasterise, keeping its text layer"
                        );
                        (Page::native(index, fragments), false)
                    }
                }
            },
            Err(err) => {
                warn!(%err, "Text layer unreadable, falling back to recognition");
                (self.recognize_page(index)?, true)
            }
        };

        let strategy = page.strategy();
        info!(strategy = strategy.as_str(), "Page strategy chosen");

        let percent = self.progress.complete_page(index, self.page_count);
        extractor.emit(ProgressUpdate {
            page_index: index,
            page_count: self.page_count,
            strategy,
            percent,
        });

        Ok(ReconstructedPage {
            index,
            strategy,
            paragraphs: extractor.reconstructor.reconstruct(page),
            text_layer_failed,
        })
    }

    /// Rasterise the page and run recognition on a scoped worker thread while
    /// forwarding its progress.
    fn recognize_page(&mut self, index: usize) -> Result<Page> {
        let extractor = self.extractor;
        let page_count = self.page_count;

        let buffer = self
            .source
            .render(index, extractor.config.effective_render_scale())?;
        debug!(width = buffer.width, height = buffer.height, "Page rasterised");

        let recognizer = extractor.recognizer;
        let language = extractor.config.language.as_str();
        let (sender, progress_rx) = ProgressSender::channel();
        let progress = &mut self.progress;

        let text = std::thread::scope(|scope| -> Result<String> {
            let worker = scope.spawn(move || recognizer.recognize(&buffer, language, &sender));

            for RecognitionProgress(fraction) in progress_rx.iter() {
                let percent = progress.update(index, page_count, fraction);
                extractor.emit(ProgressUpdate {
                    page_index: index,
                    page_count,
                    strategy: PageStrategy::Recognized,
                    percent,
                });
            }

            worker
                .join()
                .map_err(|_| QuireError::Recognition("recognition worker panicked".into()))?
        })?;

        debug!(chars = text.chars().count(), "Page recognised");
        Ok(Page::recognized(index, text))
    }
}

impl Iterator for ExtractionRun<'_, '_> {
    type Item = Result<ReconstructedPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.next_page >= self.page_count {
            return None;
        }

        let index = self.next_page;
        if self.extractor.cancel.is_cancelled() {
            info!(run = %self.run_id, page = index, "Extraction run cancelled");
            self.finished = true;
            return Some(Err(QuireError::Cancelled { page: index }));
        }

        let span = info_span!("page", run = %self.run_id, page = index);
        let result = span.in_scope(|| self.process_page(index));

        match result {
            Ok(page) => {
                self.next_page += 1;
                Some(Ok(page))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
