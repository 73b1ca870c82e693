// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion routing: pick the pipeline for a (source, target) pair and run
// it end to end from input bytes to output bytes.
//
//   PDF                   -> text / HTML   extraction
//   plain text            -> PDF           typesetting
//   workbook / delimited  -> PDF           table layout

use std::sync::mpsc;

use quire_core::EngineConfig;
use quire_core::error::{QuireError, Result};
use quire_core::types::{Document, DocumentType};
use tracing::{debug, info, instrument};

use crate::export::{DocumentWriter, HtmlWriter, PlainTextWriter};
use crate::extract::{CancellationToken, Extractor, ProgressUpdate, TextRecognizer};
use crate::input::{Sheet, detect_separator, parse_delimited, read_sheets};
use crate::layout::{Helvetica, PageGeometry, TableLayout, Typesetter};
use crate::pdf::{LopdfSource, PdfWriter};

/// Which pipeline handles a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// PDF pages to a reconstructed document.
    Extract,
    /// Flowing text to paginated PDF.
    Typeset,
    /// Tabular input to paginated PDF.
    Tabulate,
}

/// Choose the pipeline for `source` -> `target`.
pub fn route(source: DocumentType, target: DocumentType) -> Result<Route> {
    match (source, target) {
        (DocumentType::Pdf, DocumentType::PlainText | DocumentType::Html) => Ok(Route::Extract),
        (DocumentType::PlainText, DocumentType::Pdf) => Ok(Route::Typeset),
        (DocumentType::Spreadsheet | DocumentType::Delimited, DocumentType::Pdf) => {
            Ok(Route::Tabulate)
        }
        _ => Err(QuireError::UnsupportedConversion(format!(
            "no conversion path from {} to {}",
            source.mime_type(),
            target.mime_type()
        ))),
    }
}

/// Engine configuration plus the recognizer used for scanned pages.
pub struct Converter<'r> {
    config: EngineConfig,
    recognizer: &'r dyn TextRecognizer,
    cancel: CancellationToken,
    progress: Option<mpsc::Sender<ProgressUpdate>>,
}

impl<'r> Converter<'r> {
    pub fn new(config: EngineConfig, recognizer: &'r dyn TextRecognizer) -> Self {
        Self {
            config,
            recognizer,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Forward extraction progress to `sink`.
    pub fn with_progress(mut self, sink: mpsc::Sender<ProgressUpdate>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Convert `bytes` of type `source` into bytes of type `target`.
    #[instrument(skip(self, bytes), fields(bytes_len = bytes.len()))]
    pub fn convert(
        &self,
        bytes: &[u8],
        source: DocumentType,
        target: DocumentType,
    ) -> Result<Vec<u8>> {
        let route = route(source, target)?;
        info!(
            from = source.mime_type(),
            to = target.mime_type(),
            ?route,
            "Converting document"
        );

        match route {
            Route::Extract => {
                let document = self.extract(bytes)?;
                self.writer_for(target)?.write(&document)
            }
            Route::Typeset => self.typeset(utf8_text(bytes)?),
            Route::Tabulate => {
                let sheets = match source {
                    DocumentType::Delimited => {
                        let text = utf8_text(bytes)?;
                        let rows = parse_delimited(text, detect_separator(text));
                        vec![Sheet::new("", rows)]
                    }
                    _ => read_sheets(bytes)?,
                };
                self.tabulate(&sheets)
            }
        }
    }

    /// Parse a PDF and reconstruct its text.
    pub fn extract(&self, pdf: &[u8]) -> Result<Document> {
        let source = LopdfSource::from_bytes(pdf)?;
        let mut extractor = Extractor::new(self.config.clone(), self.recognizer)
            .with_cancellation(self.cancel.clone());
        if let Some(sink) = &self.progress {
            extractor = extractor.with_progress(sink.clone());
        }
        extractor.extract(&source)
    }

    /// Wrap and paginate `text` into a PDF.
    pub fn typeset(&self, text: &str) -> Result<Vec<u8>> {
        let settings = &self.config.typesetting;
        let typesetter = Typesetter::new(
            PageGeometry::from_config(settings),
            settings.font_size,
            &Helvetica,
        );
        let pages = typesetter.layout(text)?;
        debug!(pages = pages.len(), "Text typeset");
        PdfWriter::new(settings.paper_size).render(&pages)
    }

    /// Lay `sheets` out as tables in a PDF.
    pub fn tabulate(&self, sheets: &[Sheet]) -> Result<Vec<u8>> {
        let settings = &self.config.typesetting;
        let layout = TableLayout::new(
            PageGeometry::from_config(settings),
            settings.table_font_size,
            &Helvetica,
        );
        let pages = layout.layout_sheets(sheets)?;
        debug!(pages = pages.len(), "Tables laid out");
        PdfWriter::new(settings.paper_size).render(&pages)
    }

    fn writer_for(&self, target: DocumentType) -> Result<Box<dyn DocumentWriter>> {
        match target {
            DocumentType::PlainText => {
                Ok(Box::new(PlainTextWriter::new(self.config.page_markers)))
            }
            DocumentType::Html => Ok(Box::new(HtmlWriter::default())),
            other => Err(QuireError::UnsupportedConversion(format!(
                "no document writer for {}",
                other.mime_type()
            ))),
        }
    }
}

/// Text inputs must be valid UTF-8; anything else is a load failure.
fn utf8_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|err| QuireError::Load(format!("input is not valid UTF-8 text: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::engine::{PageSource, ProgressSender, UnavailableRecognizer};
    use crate::pdf::reader::tests::{build_pdf, text_page};
    use lopdf::{Stream, dictionary};
    use quire_core::types::PixelBuffer;

    const LONG_LINE: &str = "This page has a proper text layer with plenty of characters.";

    struct EchoRecognizer(&'static str);

    impl TextRecognizer for EchoRecognizer {
        fn recognize(
            &self,
            _image: &PixelBuffer,
            _language: &str,
            progress: &ProgressSender,
        ) -> Result<String> {
            progress.report(1.0);
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn routes_follow_conversion_table() {
        use DocumentType::*;
        assert_eq!(route(Pdf, PlainText).expect("route"), Route::Extract);
        assert_eq!(route(Pdf, Html).expect("route"), Route::Extract);
        assert_eq!(route(PlainText, Pdf).expect("route"), Route::Typeset);
        assert_eq!(route(Spreadsheet, Pdf).expect("route"), Route::Tabulate);
        assert_eq!(route(Delimited, Pdf).expect("route"), Route::Tabulate);
    }

    #[test]
    fn unsupported_pairs_are_rejected() {
        let err = route(DocumentType::Html, DocumentType::Pdf).expect_err("must fail");
        assert!(matches!(err, QuireError::UnsupportedConversion(_)));
        assert!(route(DocumentType::Pdf, DocumentType::Pdf).is_err());
    }

    #[test]
    fn native_pdf_extracts_to_text_without_recognition() {
        let pdf = build_pdf(vec![text_page(&[LONG_LINE, "Second line"])], None);
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let out = converter
            .convert(&pdf, DocumentType::Pdf, DocumentType::PlainText)
            .expect("convert");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, format!("--- Page 1 ---\n{LONG_LINE}\nSecond line\n"));
    }

    #[test]
    fn scanned_pdf_goes_through_recognizer() {
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2_i64,
                "Height" => 2_i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            },
            vec![0, 255, 255, 0],
        );
        let pdf = build_pdf(vec![text_page(&[])], Some(image));
        let recognizer = EchoRecognizer("Scanned words\n\nNext block");
        let (tx, rx) = mpsc::channel();
        let converter = Converter::new(EngineConfig::default(), &recognizer).with_progress(tx);

        let out = converter
            .convert(&pdf, DocumentType::Pdf, DocumentType::Html)
            .expect("convert");
        let html = String::from_utf8(out).expect("utf8");
        assert!(html.contains("<p>Scanned words</p>\n<p>Next block</p>"));

        let updates: Vec<ProgressUpdate> = rx.try_iter().collect();
        assert_eq!(updates.last().map(|u| u.percent), Some(100));
    }

    fn one_pixel_image() -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1_i64,
                "Height" => 1_i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            },
            vec![0],
        )
    }

    #[test]
    fn short_vector_title_page_keeps_its_text() {
        let pdf = build_pdf(vec![text_page(&["Chapter One"])], None);
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let out = converter
            .convert(&pdf, DocumentType::Pdf, DocumentType::PlainText)
            .expect("convert");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "--- Page 1 ---\nChapter One\n"
        );
    }

    #[test]
    fn missing_recognizer_fails_scanned_pages() {
        let pdf = build_pdf(vec![text_page(&["tiny"])], Some(one_pixel_image()));
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let err = converter
            .convert(&pdf, DocumentType::Pdf, DocumentType::PlainText)
            .expect_err("must fail");
        assert!(matches!(err, QuireError::Recognition(_)));
    }

    #[test]
    fn text_typesets_to_pdf() {
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let text = "word ".repeat(3000);
        let out = converter
            .convert(text.as_bytes(), DocumentType::PlainText, DocumentType::Pdf)
            .expect("convert");
        assert!(out.starts_with(b"%PDF"));
        let reloaded = LopdfSource::from_bytes(&out).expect("reload");
        assert!(reloaded.page_count() > 1);
    }

    #[test]
    fn delimited_rows_tabulate_to_pdf() {
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let out = converter
            .convert(b"part\tqty\nbolt\t4\n", DocumentType::Delimited, DocumentType::Pdf)
            .expect("convert");
        let reloaded = LopdfSource::from_bytes(&out).expect("reload");
        assert_eq!(reloaded.page_count(), 1);
    }

    #[test]
    fn non_utf8_text_inputs_are_load_errors() {
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        for source in [DocumentType::PlainText, DocumentType::Delimited] {
            let err = converter
                .convert(b"caf\xff invalid", source, DocumentType::Pdf)
                .expect_err("must fail");
            assert!(matches!(err, QuireError::Load(_)), "{source:?}");
        }
    }

    #[test]
    fn corrupt_pdf_is_a_load_error() {
        let converter = Converter::new(EngineConfig::default(), &UnavailableRecognizer);
        let err = converter
            .convert(b"%PDF-garbage", DocumentType::Pdf, DocumentType::PlainText)
            .expect_err("must fail");
        assert!(matches!(err, QuireError::Load(_)));
    }
}
