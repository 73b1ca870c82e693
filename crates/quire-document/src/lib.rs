// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire-document: conversion between PDF and editable formats.
//
// Extraction reads each PDF page either from its embedded text layer or, for
// scanned pages, through optical recognition, and rebuilds paragraphs.
// Generation typesets plain text and lays out tables into paginated PDF.

pub mod convert;
pub mod export;
pub mod extract;
pub mod image;
pub mod input;
pub mod layout;
pub mod pdf;
pub mod scan;

// Re-export the primary entry points so callers can use `quire_document::Converter` etc.
pub use convert::{Converter, Route, route};
pub use export::{DocumentWriter, HtmlWriter, PlainTextWriter};
pub use extract::{
    CancellationToken, Extractor, PageSource, ProgressUpdate, TextRecognizer,
    UnavailableRecognizer,
};
pub use input::Sheet;
pub use layout::{PageGeometry, TableLayout, Typesetter};
pub use pdf::{LopdfSource, PdfWriter};

#[cfg(feature = "ocr")]
pub use scan::{OcrConfig, OcrsRecognizer};
