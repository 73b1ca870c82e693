// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.
//
// Passed explicitly into every converter at construction. Nothing in Quire
// reads process-wide engine state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;

/// Settings that drive extraction and generation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Recognition locale. Only one language is used per run.
    pub language: String,
    /// Scale factor for raster fallback, relative to 72 dpi.
    pub render_scale: f32,
    /// Minimum trimmed native-text length for a page to skip recognition.
    pub native_text_min_chars: usize,
    /// Maximum baseline distance for two fragments to share a line.
    pub line_threshold: f32,
    /// Emit `--- Page N ---` markers in plain-text output.
    pub page_markers: bool,
    /// Directory holding the recognition models. `None` uses the ocrs cache.
    pub ocr_model_dir: Option<PathBuf>,
    pub typesetting: TypesettingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "eng".into(),
            render_scale: 2.0,
            native_text_min_chars: 50,
            line_threshold: 5.0,
            page_markers: true,
            ocr_model_dir: None,
            typesetting: TypesettingConfig::default(),
        }
    }
}

/// Lowest scale the raster fallback will render at.
pub const MIN_RENDER_SCALE: f32 = 2.0;

impl EngineConfig {
    /// Render scale clamped to at least [`MIN_RENDER_SCALE`].
    pub fn effective_render_scale(&self) -> f32 {
        if self.render_scale.is_finite() {
            self.render_scale.max(MIN_RENDER_SCALE)
        } else {
            MIN_RENDER_SCALE
        }
    }

    /// Load a config from a JSON file. Missing keys take their defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(?config, "Engine config loaded");
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }
}

/// Page setup for generated PDFs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypesettingConfig {
    pub paper_size: crate::PaperSize,
    /// Margin on every side, in points.
    pub margin_pt: f32,
    /// Body font size for typeset text, in points.
    pub font_size: f32,
    /// Font size for table cells, in points.
    pub table_font_size: f32,
}

impl Default for TypesettingConfig {
    fn default() -> Self {
        Self {
            paper_size: crate::PaperSize::A4,
            margin_pt: 50.0,
            font_size: 12.0,
            table_font_size: 9.0,
        }
    }
}
