//! Data-source collaborators.
//!
//! A [`RecordSource`] supplies the raw text of the two sheets for one
//! refresh. The map pipeline never talks to files or services directly, so
//! a spreadsheet export on disk and an in-memory fixture look the same.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, error};

use relmap_parser::SheetKind;

use crate::RelmapError;

/// CSV text of the Elements and Connections sheets, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSources {
    elements: String,
    connections: String,
}

impl SheetSources {
    /// Create sheet sources from the text of both sheets.
    pub fn new(elements: impl Into<String>, connections: impl Into<String>) -> Self {
        Self {
            elements: elements.into(),
            connections: connections.into(),
        }
    }

    /// Text of the Elements sheet.
    pub fn elements(&self) -> &str {
        &self.elements
    }

    /// Text of the Connections sheet.
    pub fn connections(&self) -> &str {
        &self.connections
    }

    /// Text of the sheet of the given kind.
    ///
    /// Diagnostic spans are offsets into this text.
    pub fn get(&self, kind: SheetKind) -> &str {
        match kind {
            SheetKind::Elements => &self.elements,
            SheetKind::Connections => &self.connections,
        }
    }
}

/// Supplies both sheets for a refresh.
///
/// Implementations may block; a refresh starts with exactly one call to
/// [`RecordSource::fetch`].
pub trait RecordSource {
    /// Fetch the current contents of both sheets.
    ///
    /// # Errors
    ///
    /// Returns [`RelmapError::Io`] if the sheets cannot be read.
    fn fetch(&self) -> Result<SheetSources, RelmapError>;
}

/// Reads both sheets from CSV files on every fetch.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    elements: PathBuf,
    connections: PathBuf,
}

impl CsvFileSource {
    /// Create a source reading the two given CSV files.
    pub fn new(elements: impl Into<PathBuf>, connections: impl Into<PathBuf>) -> Self {
        Self {
            elements: elements.into(),
            connections: connections.into(),
        }
    }

    fn read(path: &Path) -> Result<String, RelmapError> {
        fs::read_to_string(path).map_err(|err| {
            error!(path:? = path, err:err; "Failed to read sheet");
            RelmapError::Io(err)
        })
    }
}

impl RecordSource for CsvFileSource {
    fn fetch(&self) -> Result<SheetSources, RelmapError> {
        let elements = Self::read(&self.elements)?;
        let connections = Self::read(&self.connections)?;

        debug!(
            elements_bytes = elements.len(),
            connections_bytes = connections.len();
            "Sheets fetched from disk"
        );
        Ok(SheetSources::new(elements, connections))
    }
}

/// Serves fixed sheet text, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    sources: SheetSources,
}

impl StaticSource {
    /// Create a source that always returns the given text.
    pub fn new(elements: impl Into<String>, connections: impl Into<String>) -> Self {
        Self {
            sources: SheetSources::new(elements, connections),
        }
    }
}

impl RecordSource for StaticSource {
    fn fetch(&self) -> Result<SheetSources, RelmapError> {
        Ok(self.sources.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_static_source() {
        let source = StaticSource::new("Label\nA\n", "From,To\n");
        let sheets = source.fetch().unwrap();

        assert_eq!(sheets.elements(), "Label\nA\n");
        assert_eq!(sheets.get(SheetKind::Connections), "From,To\n");
    }

    #[test]
    fn test_csv_file_source_missing_file() {
        let source = CsvFileSource::new("/nonexistent/elements.csv", "/nonexistent/connections.csv");

        match source.fetch() {
            Err(RelmapError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
            other => panic!("Expected I/O error, got {other:?}"),
        }
    }
}
