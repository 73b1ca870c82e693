// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text measurement for layout.

/// Measures the rendered width of a string, in points.
pub trait TextMeasure {
    fn width(&self, text: &str, font_size: f32) -> f32;
}

/// Advance widths of the builtin Helvetica face for U+0020..=U+007E, in
/// 1/1000 em, from the Adobe core font metrics.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' ' .. '/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0' .. '9'
    278, 278, 584, 584, 584, 556, 1015, // ':' .. '@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A' .. 'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N' .. 'Z'
    278, 278, 278, 469, 556, 333, // '[' .. '`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a' .. 'm'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n' .. 'z'
    334, 260, 334, 584, // '{' .. '~'
];

/// Width used for characters outside the table.
const HELVETICA_FALLBACK: u16 = 556;

/// Metrics for the builtin Helvetica font used by the PDF writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Helvetica;

impl TextMeasure for Helvetica {
    fn width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| {
                let code = ch as u32;
                if (0x20..=0x7e).contains(&code) {
                    HELVETICA_WIDTHS[(code - 0x20) as usize] as u32
                } else {
                    HELVETICA_FALLBACK as u32
                }
            })
            .sum();
        units as f32 * font_size / 1000.0
    }
}

/// Every character advances by the same fraction of the font size.
#[derive(Debug, Clone, Copy)]
pub struct Monospace {
    pub advance: f32,
}

impl Default for Monospace {
    /// Courier's advance of 0.6 em.
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasure for Monospace {
    fn width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.advance * font_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_known_widths() {
        // "Hi" = 722 + 222 units
        let width = Helvetica.width("Hi", 10.0);
        assert!((width - 9.44).abs() < 1e-4, "got {width}");
        assert_eq!(Helvetica.width("", 12.0), 0.0);
    }

    #[test]
    fn helvetica_falls_back_for_non_ascii() {
        assert_eq!(Helvetica.width("é", 1000.0), 556.0);
    }

    #[test]
    fn monospace_counts_chars() {
        let mono = Monospace { advance: 0.5 };
        assert_eq!(mono.width("abcd", 10.0), 20.0);
        assert!((Monospace::default().width("ab", 10.0) - 12.0).abs() < 1e-4);
    }
}
