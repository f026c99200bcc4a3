//! # Relmap Parser
//!
//! Reads the two relationship sheets (Elements and Connections) from their
//! CSV text and normalizes rows into typed records. Bad rows never abort
//! reading: each one is skipped and reported as a [`error::Diagnostic`].
//!
//! ## Usage
//!
//! ```
//! # use relmap_parser::{read_connections, read_elements};
//! let elements = read_elements("Label,Type\nLazarus Group,Group\nWannaCry,Ransomware\n");
//! let connections = read_connections("From,To\nLazarus Group,WannaCry\n");
//!
//! assert_eq!(elements.records().len(), 2);
//! assert_eq!(connections.records()[0].to, "WannaCry");
//! ```

pub mod error;
mod normalize;
mod record;
mod sheet;
mod span;

pub use normalize::{Normalized, columns, normalize_connections, normalize_elements};
pub use record::{Connection, Element, Row, RowRef, SheetKind, UNKNOWN_TYPE};
pub use sheet::{Sheet, parse_sheet};
pub use span::Span;

/// Read and normalize an Elements sheet.
///
/// Diagnostics from reading the sheet come first, followed by those from
/// normalizing its rows.
pub fn read_elements(source: &str) -> Normalized<Element> {
    let sheet = parse_sheet(source, SheetKind::Elements);
    normalize_elements(&sheet).with_leading(sheet.diagnostics())
}

/// Read and normalize a Connections sheet.
///
/// Diagnostics are ordered as in [`read_elements`].
pub fn read_connections(source: &str) -> Normalized<Connection> {
    let sheet = parse_sheet(source, SheetKind::Connections);
    normalize_connections(&sheet).with_leading(sheet.diagnostics())
}
