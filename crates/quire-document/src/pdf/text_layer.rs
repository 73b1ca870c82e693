// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text layer walker: turns a decoded content stream into positioned text
// fragments, one per text-showing operator, in content-stream order.

use lopdf::Object;
use lopdf::content::Operation;
use quire_core::types::TextFragment;

/// A `TJ` displacement wider than this many ems is read as a word gap.
const TJ_WORD_GAP_EM: f32 = 0.15;

/// Affine transform in PDF row-vector form `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let [a, b, c, d, e, f] = numbers::<6>(operands)?;
        Some(Self { a, b, c, d, e, f })
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

/// The parts of the graphics state that `q`/`Q` save and restore and that
/// affect where text lands.
#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    leading: f32,
    horizontal_scaling: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            leading: 0.0,
            horizontal_scaling: 1.0,
        }
    }
}

struct Walker {
    page_index: usize,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    fragments: Vec<TextFragment>,
}

impl Walker {
    fn new(page_index: usize) -> Self {
        Self {
            page_index,
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            fragments: Vec::new(),
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let operands = operation.operands.as_slice();
        match operation.operator.as_str() {
            "q" => self.saved.push(self.state),
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.state.ctm = m.then(&self.state.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = numbers::<2>(operands) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "TL" => {
                if let Some([leading]) = numbers::<1>(operands) {
                    self.state.leading = leading;
                }
            }
            "Tz" => {
                if let Some([scale]) = numbers::<1>(operands) {
                    self.state.horizontal_scaling = scale / 100.0;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(decode_text_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = self.join_tj_items(items);
                    self.show(text);
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(decode_text_string(bytes));
                }
            }
            "\"" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(decode_text_string(bytes));
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn join_tj_items(&self, items: &[Object]) -> String {
        let mut text = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => text.push_str(&decode_text_string(bytes)),
                other => {
                    let Ok(adjustment) = other.as_float() else {
                        continue;
                    };
                    let gap_em = -adjustment / 1000.0 * self.state.horizontal_scaling;
                    if gap_em > TJ_WORD_GAP_EM && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
        text
    }

    fn show(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        let device = self.text_matrix.then(&self.state.ctm);
        self.fragments
            .push(TextFragment::new(text, device.e, device.f, self.page_index));
    }
}

/// Walk `operations` and collect one fragment per non-blank show operator.
pub fn fragments_from_operations(operations: &[Operation], page_index: usize) -> Vec<TextFragment> {
    let mut walker = Walker::new(page_index);
    for operation in operations {
        walker.apply(operation);
    }
    walker.fragments
}

/// Decode a PDF text string: UTF-16BE when it carries a byte-order mark,
/// otherwise one byte per character.
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, operand) in out.iter_mut().zip(operands) {
        *slot = operand.as_float().ok()?;
    }
    Some(out)
}
