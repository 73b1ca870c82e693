// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable failure messages.
//
// A run that fails reports exactly one message to the user, naming the stage
// that stopped it and what they can try next.

use crate::error::{QuireError, Stage};

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Stage the run stopped in.
    pub stage: Stage,
    /// Whether running the same conversion again could plausibly succeed.
    /// Quire itself never retries.
    pub retriable: bool,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert a `QuireError` into the single message shown for a failed run.
pub fn humanize_error(err: &QuireError) -> HumanError {
    let stage = err.stage();
    match err {
        QuireError::Load(detail) => humanize_load_error(detail),

        QuireError::Render(_) => HumanError {
            message: "A page of this PDF couldn't be turned into an image for text recognition.".into(),
            suggestion: "The page may use an image format we can't read. Try exporting the PDF again from the program that made it.".into(),
            stage,
            retriable: false,
        },

        QuireError::Recognition(_) => HumanError {
            message: "Text recognition didn't work on this document.".into(),
            suggestion: "Check that the recognition models are installed, then try again. Clearer scans give better results.".into(),
            stage,
            retriable: true,
        },

        QuireError::Layout(detail) => HumanError {
            message: "The text couldn't be laid out on the page.".into(),
            suggestion: format!("Try a larger paper size or smaller margins. ({detail})"),
            stage,
            retriable: false,
        },

        QuireError::Cancelled { .. } => HumanError {
            message: "The conversion was cancelled.".into(),
            suggestion: "Nothing was saved. Start the conversion again when you're ready.".into(),
            stage,
            retriable: true,
        },

        QuireError::UnsupportedConversion(detail) => HumanError {
            message: "That conversion isn't available.".into(),
            suggestion: format!("Pick a different output format. ({detail})"),
            stage,
            retriable: false,
        },

        QuireError::Image(_) => HumanError {
            message: "An image inside this PDF couldn't be decoded.".into(),
            suggestion: "The file may be damaged. Try a different copy of the document.".into(),
            stage,
            retriable: false,
        },

        QuireError::Sheet(_) => HumanError {
            message: "The spreadsheet couldn't be read.".into(),
            suggestion: "Save it as .xlsx or as tab-separated text and try again.".into(),
            stage,
            retriable: false,
        },

        QuireError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    stage,
                    retriable: false,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Quire doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    stage,
                    retriable: false,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your storage may be full.".into(),
                    stage,
                    retriable: true,
                }
            }
        }

        QuireError::Serialization(_) => HumanError {
            message: "The settings file couldn't be read.".into(),
            suggestion: "Check the file is valid JSON, or delete it to go back to the defaults.".into(),
            stage,
            retriable: false,
        },
    }
}

fn humanize_load_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("encrypt") || lower.contains("password") {
        HumanError {
            message: "This PDF is password protected.".into(),
            suggestion: "Remove the password in the program that created it, then try again.".into(),
            stage: Stage::Load,
            retriable: false,
        }
    } else {
        HumanError {
            message: "This file doesn't look like a readable PDF.".into(),
            suggestion: "The file may be damaged or in a different format. Try opening it in a PDF viewer first.".into(),
            stage: Stage::Load,
            retriable: false,
        }
    }
}
