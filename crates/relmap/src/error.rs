//! Error types for relmap operations.
//!
//! This module provides the main error type [`RelmapError`]. Bad rows never
//! produce an error by themselves; they become diagnostics on the built
//! state unless strict mode turns them into [`RelmapError::Parse`].

use std::io;

use thiserror::Error;

use relmap_parser::error::ParseError;

use crate::source::SheetSources;

/// The main error type for relmap operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the sheet sources the diagnostics point
/// into, so a reporter can show the offending rows.
#[derive(Debug, Error)]
pub enum RelmapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse {
        err: ParseError,
        sources: SheetSources,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for RelmapError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl RelmapError {
    /// Create a new `Parse` error with the sheets it refers to.
    pub fn new_parse_error(err: ParseError, sources: SheetSources) -> Self {
        Self::Parse { err, sources }
    }
}
