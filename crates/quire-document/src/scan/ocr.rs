// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Optical recognition of rasterised pages with the `ocrs` crate, a pure-Rust
// OCR engine backed by neural network models executed via `rten`.
//
// Only available with the `ocr` feature.
//
// The engine needs two model files in one directory:
//
// - `text-detection.rten` locates words on the page.
// - `text-recognition.rten` decodes characters from detected lines.
//
// Running `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is also where they are looked for by
// default.

use std::path::{Path, PathBuf};

use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use quire_core::EngineConfig;
use quire_core::error::{QuireError, Result};
use quire_core::types::PixelBuffer;
use rten::Model;
use tracing::{debug, info, instrument, warn};

use crate::extract::engine::{ProgressSender, TextRecognizer};

/// Language the bundled recognition model is trained for.
pub const MODEL_LANGUAGE: &str = "eng";

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

// Fractions of a page's recognition job reported after each engine stage.
const PREPARED: f32 = 0.1;
const WORDS_DETECTED: f32 = 0.4;
const LINES_GROUPED: f32 = 0.5;
const RECOGNIZED: f32 = 1.0;

/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// The configured model directory, or the default cache.
    pub fn for_engine(config: &EngineConfig) -> Self {
        match &config.ocr_model_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::default(),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<()> {
        for (role, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(QuireError::Recognition(format!(
                    "{role} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    pub fn models_available(&self) -> bool {
        self.validate().is_ok()
    }
}

/// [`TextRecognizer`] backed by the `ocrs` engine.
///
/// Model loading is the expensive step; construct once per run and reuse for
/// every page. `ocrs` and `rten` are very slow in debug builds.
pub struct OcrsRecognizer {
    engine: OcrsEngine,
}

impl OcrsRecognizer {
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: &OcrConfig) -> Result<Self> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            QuireError::Recognition(format!(
                "failed to load detection model from {}: {err}",
                config.detection_model_path.display()
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                QuireError::Recognition(format!(
                    "failed to load recognition model from {}: {err}",
                    config.recognition_model_path.display()
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| {
            QuireError::Recognition(format!("failed to initialise OCR engine: {err}"))
        })?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }
}

impl TextRecognizer for OcrsRecognizer {
    #[instrument(skip_all, fields(
        width = image.width,
        height = image.height,
        language = %language,
    ))]
    fn recognize(
        &self,
        image: &PixelBuffer,
        language: &str,
        progress: &ProgressSender,
    ) -> Result<String> {
        if language != MODEL_LANGUAGE {
            warn!(
                language,
                model = MODEL_LANGUAGE,
                "No model for requested language; using the loaded model"
            );
        }

        let decoded = image::load_from_memory(&image.png)
            .map_err(|err| QuireError::Recognition(format!("cannot decode page image: {err}")))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            QuireError::Recognition(format!(
                "failed to create image source ({width}x{height}): {err}"
            ))
        })?;
        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| QuireError::Recognition(format!("OCR preprocessing failed: {err}")))?;
        progress.report(PREPARED);

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| QuireError::Recognition(format!("word detection failed: {err}")))?;
        debug!(word_count = word_rects.len(), "Words detected");
        progress.report(WORDS_DETECTED);

        let line_rects = self.engine.find_text_lines(&input, &word_rects);
        debug!(line_count = line_rects.len(), "Text lines found");
        progress.report(LINES_GROUPED);

        let line_texts = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| QuireError::Recognition(format!("line recognition failed: {err}")))?;
        progress.report(RECOGNIZED);

        let lines: Vec<String> = line_texts
            .iter()
            .flatten()
            .map(|line| line.to_string())
            .filter(|line| !line.trim().is_empty())
            .collect();
        debug!(recognized_lines = lines.len(), "Recognition complete");

        Ok(lines.join("\n"))
    }
}
