//! JSON export of the render model.

use log::debug;

use super::{Error, Exporter};
use crate::render::RenderModel;

/// Serialize `model` as pretty-printed JSON.
///
/// The document has the keys `title`, `nodes`, `edges`, `positions`,
/// `search_options`, `color_map` and `selected`.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
pub fn to_json(model: &RenderModel) -> Result<String, Error> {
    let json = serde_json::to_string_pretty(model)?;
    debug!(bytes = json.len(); "Render model serialized");
    Ok(json)
}

/// [`Exporter`] producing [`to_json`] output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export(&self, model: &RenderModel) -> Result<String, Error> {
        to_json(model)
    }
}
