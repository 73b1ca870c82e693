// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tabular input: workbooks and delimited text, normalised to sheets of
// string cells.

pub mod sheet;

pub use sheet::{Sheet, detect_separator, parse_delimited, read_sheets};
