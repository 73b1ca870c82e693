// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Quire converter.
//
// Layout coordinates are PDF points with the origin at the bottom-left of the
// page, so larger `y` values sit higher on the page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversion run, attached to log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Extraction direction -----------------------------------------------------

/// A positioned run of text reported by the PDF text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub x: f32,
    pub y_baseline: f32,
    pub page_index: usize,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, x: f32, y_baseline: f32, page_index: usize) -> Self {
        Self {
            text: text.into(),
            x,
            y_baseline,
            page_index,
        }
    }
}

/// How a page's content was obtained. Chosen once per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStrategy {
    /// Embedded, positioned text is treated as ground truth.
    NativeText,
    /// The page was rasterised and run through optical recognition.
    Recognized,
}

impl PageStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeText => "native-text",
            Self::Recognized => "recognized",
        }
    }
}

/// Content of a page under its chosen strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageContent {
    NativeText(Vec<TextFragment>),
    Recognized(String),
}

/// One source page after its strategy has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub content: PageContent,
}

impl Page {
    pub fn native(index: usize, fragments: Vec<TextFragment>) -> Self {
        Self {
            index,
            content: PageContent::NativeText(fragments),
        }
    }

    pub fn recognized(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            content: PageContent::Recognized(text.into()),
        }
    }

    pub fn strategy(&self) -> PageStrategy {
        match self.content {
            PageContent::NativeText(_) => PageStrategy::NativeText,
            PageContent::Recognized(_) => PageStrategy::Recognized,
        }
    }
}

/// Fragments sharing one baseline bucket, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub y_bucket: f32,
    pub fragments: Vec<TextFragment>,
}

impl Line {
    /// Fragment texts joined by single spaces.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub page_index: usize,
    pub text: String,
    /// Strategy of the page the paragraph came from. Serializers use it to
    /// decide whether the text still carries recognition line breaks.
    pub strategy: PageStrategy,
}

/// Per-run counters reported alongside the reconstructed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub native_pages: usize,
    pub recognized_pages: usize,
    /// Pages whose text layer could not be read and fell back to recognition.
    pub text_layer_failures: usize,
}

/// The reconstructed document: paragraphs in page order, then line order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_count: usize,
    pub paragraphs: Vec<Paragraph>,
    pub summary: RunSummary,
}

impl Document {
    /// Paragraphs belonging to one page.
    pub fn page_paragraphs(&self, page_index: usize) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs
            .iter()
            .filter(move |paragraph| paragraph.page_index == page_index)
    }
}

/// A rasterised page, PNG-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

// -- Generation direction -----------------------------------------------------

/// One line of text placed on an output page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

/// Final per-column widths for one sheet. Frozen once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWidths(Vec<f32>);

impl ColumnWidths {
    pub fn new(widths: Vec<f32>) -> Self {
        Self(widths)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f32 {
        self.0.iter().sum()
    }
}

/// Supported input and output document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    PlainText,
    Html,
    /// XLSX, XLS, or ODS workbook.
    Spreadsheet,
    /// Tab- or comma-separated rows.
    Delimited,
}

impl DocumentType {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
            Self::Html => "text/html",
            Self::Spreadsheet => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Delimited => "text/tab-separated-values",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" | "md" => Some(Self::PlainText),
            "html" | "htm" => Some(Self::Html),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(Self::Spreadsheet),
            "tsv" | "csv" => Some(Self::Delimited),
            _ => None,
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (1/72 inch).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        const PT_PER_MM: f32 = 72.0 / 25.4;
        let (w, h) = self.dimensions_mm();
        (w as f32 * PT_PER_MM, h as f32 * PT_PER_MM)
    }
}
