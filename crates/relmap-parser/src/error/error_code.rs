//! Error codes for the relmap diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Sheet syntax errors
//! - `E1xx` - Header errors
//! - `E2xx` - Row normalization errors
//! - `E3xx` - Graph building diagnostics
//! - `E4xx` - Layout diagnostics

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Sheet Syntax Errors (E0xx)
    // =========================================================================
    /// Unterminated quoted field.
    ///
    /// A cell was opened with a double quote but never closed.
    E001,

    /// Unexpected character after a closing quote.
    ///
    /// A quoted cell must be followed by a comma or the end of the record.
    E002,

    // =========================================================================
    // Header Errors (E1xx)
    // =========================================================================
    /// Missing header row.
    ///
    /// The sheet is empty, so no columns could be resolved.
    E100,

    /// Required column missing.
    ///
    /// The header does not name a column the sheet must provide, e.g.
    /// `Label` for elements or `From`/`To` for connections.
    E101,

    /// Duplicate column name.
    ///
    /// Two header cells carry the same name; the first one is used.
    E102,

    // =========================================================================
    // Row Errors (E2xx)
    // =========================================================================
    /// Missing required field.
    ///
    /// A row lacks a value for a required column and was skipped.
    E200,

    /// Extra cells.
    ///
    /// A row has more cells than the header has columns; the extra cells
    /// are ignored.
    E201,

    // =========================================================================
    // Graph Diagnostics (E3xx)
    // =========================================================================
    /// Duplicate label.
    ///
    /// Two elements share a label. The later row overwrites the earlier one.
    E300,

    /// Unknown reference.
    ///
    /// A connection names a label that no element defines. A node with
    /// default attributes is created for it.
    E301,

    /// Empty connection endpoint.
    ///
    /// A connection reached the graph builder without a `From` or `To`
    /// value and was skipped.
    E302,

    // =========================================================================
    // Layout Diagnostics (E4xx)
    // =========================================================================
    /// Degenerate layout.
    ///
    /// Two nodes occupied the same position; they were separated along a
    /// fixed fallback direction.
    E400,
}

impl ErrorCode {
    /// Returns the error code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E400 => "E400",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated quoted field",
            ErrorCode::E002 => "unexpected character after closing quote",
            ErrorCode::E100 => "missing header row",
            ErrorCode::E101 => "required column missing",
            ErrorCode::E102 => "duplicate column name",
            ErrorCode::E200 => "missing required field",
            ErrorCode::E201 => "extra cells",
            ErrorCode::E300 => "duplicate label",
            ErrorCode::E301 => "unknown reference",
            ErrorCode::E302 => "empty connection endpoint",
            ErrorCode::E400 => "coincident nodes",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
