// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Workbook and delimited-text readers. Every cell becomes display text; the
// table layout engine never sees typed values.

use std::io::Cursor;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use quire_core::error::{QuireError, Result};
use tracing::{debug, instrument, warn};

/// One named grid of cells. Rows may have different lengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Read every worksheet of an XLSX, XLS, XLSB or ODS workbook.
///
/// Worksheets that cannot be read are skipped with a warning; a workbook with
/// no readable worksheet is an error.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn read_sheets(bytes: &[u8]) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|err| QuireError::Sheet(format!("failed to open workbook: {err}")))?;

    let names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());

    for name in &names {
        match workbook.worksheet_range(name) {
            Ok(range) => sheets.push(sheet_from_range(name, &range)),
            Err(err) => warn!(sheet = %name, %err, "Skipping unreadable worksheet"),
        }
    }

    if sheets.is_empty() {
        return Err(QuireError::Sheet("workbook has no readable worksheets".into()));
    }

    debug!(sheets = sheets.len(), "Workbook read");
    Ok(sheets)
}

fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    Sheet::new(name, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::Error(e) => format!("#ERR:{e:?}"),
    }
}

/// Tab when the first line contains one, otherwise comma.
pub fn detect_separator(text: &str) -> char {
    match text.lines().next() {
        Some(first) if first.contains('\t') => '\t',
        _ => ',',
    }
}

/// Split delimited text into rows of cells.
///
/// Double-quoted cells may contain the separator and `""` for a literal
/// quote. Quoted cells do not span lines. Blank lines are dropped.
pub fn parse_delimited(text: &str, separator: char) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_record(line, separator))
        .collect()
}

fn split_record(line: &str, separator: char) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    quoted = false;
                }
            }
            '"' if current.is_empty() => quoted = true,
            c if c == separator && !quoted => cells.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn cells_render_as_display_text() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Float(1.25)), "1.25");
        assert_eq!(cell_to_string(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_to_string(&Data::String("Hello".into())), "Hello");
    }

    #[test]
    fn tab_separated_rows() {
        let rows = parse_delimited("name\tqty\nbolts\t40\n\nnuts\t12\n", '\t');
        assert_eq!(
            rows,
            vec![row(&["name", "qty"]), row(&["bolts", "40"]), row(&["nuts", "12"])]
        );
    }

    #[test]
    fn quoted_cells_keep_separators_and_quotes() {
        let rows = parse_delimited("a,\"b, c\",\"say \"\"hi\"\"\"\r\n", ',');
        assert_eq!(rows, vec![row(&["a", "b, c", "say \"hi\""])]);
    }

    #[test]
    fn empty_trailing_cells_are_kept() {
        assert_eq!(parse_delimited("x,,", ','), vec![row(&["x", "", ""])]);
    }

    #[test]
    fn separator_detection() {
        assert_eq!(detect_separator("a\tb\nc,d"), '\t');
        assert_eq!(detect_separator("a,b"), ',');
        assert_eq!(detect_separator(""), ',');
    }

    #[test]
    fn garbage_workbook_is_a_sheet_error() {
        let err = read_sheets(b"definitely not a workbook").expect_err("must fail");
        assert!(matches!(err, QuireError::Sheet(_)));
    }
}
