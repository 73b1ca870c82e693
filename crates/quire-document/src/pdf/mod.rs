// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module: reading source documents (text layer and raster fallback) and
// writing typeset output.

pub mod raster;
pub mod reader;
pub mod text_layer;
pub mod writer;

pub use reader::LopdfSource;
pub use writer::PdfWriter;
