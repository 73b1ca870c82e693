// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quire.
//
// Every failure aborts the conversion run it occurred in. There are no
// automatic retries anywhere in the pipeline.

use thiserror::Error;

/// Top-level error type for all Quire operations.
#[derive(Debug, Error)]
pub enum QuireError {
    // -- Pipeline stages --
    #[error("could not load document: {0}")]
    Load(String),

    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("text recognition failed: {0}")]
    Recognition(String),

    #[error("layout failed: {0}")]
    Layout(String),

    #[error("conversion cancelled before page {page}")]
    Cancelled { page: usize },

    // -- Inputs and outputs --
    #[error("unsupported conversion: {0}")]
    UnsupportedConversion(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("spreadsheet could not be read: {0}")]
    Sheet(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The pipeline stage a failure is attributed to when reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Render,
    Recognition,
    Layout,
    Output,
    Cancelled,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Load => "loading",
            Self::Render => "rendering",
            Self::Recognition => "text recognition",
            Self::Layout => "layout",
            Self::Output => "output",
            Self::Cancelled => "cancelled",
        }
    }
}

impl QuireError {
    /// Stage that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Load(_) | Self::Sheet(_) | Self::UnsupportedConversion(_) => Stage::Load,
            Self::Render(_) | Self::Image(_) => Stage::Render,
            Self::Recognition(_) => Stage::Recognition,
            Self::Layout(_) => Stage::Layout,
            Self::Cancelled { .. } => Stage::Cancelled,
            Self::Io(_) | Self::Serialization(_) => Stage::Output,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuireError>;
