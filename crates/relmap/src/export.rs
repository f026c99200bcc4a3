//! Export functionality for relationship maps.
//!
//! This module provides the [`Exporter`] trait that turns a [`RenderModel`]
//! into an output document. It is the last stage of the pipeline:
//!
//! ```text
//! Sheet text
//!     ↓ read + normalize
//! Records
//!     ↓ build
//! Graph
//!     ↓ layout
//! GraphState → RenderModel
//!     ↓ export (this module)
//! SVG / JSON
//! ```
//!
//! # Available Backends
//!
//! - [`svg`]: static SVG drawing via [`svg::SvgExporter`]
//! - [`json`]: the render model as JSON for browser front-ends

pub mod json;
pub mod svg;

use crate::render::RenderModel;

/// Abstraction for map export backends.
pub trait Exporter {
    /// Render `model` to the backend's output format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the model cannot be converted to the
    /// target format.
    fn export(&self, model: &RenderModel) -> Result<String, Error>;
}

/// Errors that can occur during export.
///
/// Converted into [`RelmapError::Export`] at the crate boundary.
///
/// [`RelmapError::Export`]: crate::RelmapError::Export
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// Serialization of the render model failed.
    Json(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
