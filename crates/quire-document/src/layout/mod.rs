// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Generation direction: text and tables laid out into positioned draw
// instructions, one list per output page.

pub mod cursor;
pub mod metrics;
pub mod table;
pub mod typesetter;

pub use cursor::{LINE_HEIGHT_FACTOR, LayoutCursor, PageGeometry};
pub use metrics::{Helvetica, Monospace, TextMeasure};
pub use table::{TableLayout, compute_column_widths, fit_cell};
pub use typesetter::Typesetter;
