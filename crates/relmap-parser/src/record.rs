//! Typed records and the row plumbing they are extracted from.
//!
//! A [`Row`] is one data record of a sheet: an ordered mapping from header
//! name to cell text, tagged with a [`RowRef`] so diagnostics can point back
//! at it. The normalizer turns rows into [`Element`]s and [`Connection`]s.

use std::fmt;

use indexmap::IndexMap;

use crate::span::Span;

/// Type assigned to elements whose `Type` cell is missing or blank.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Which of the two input sheets a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKind {
    /// Entities: `Label, Type, Description, AKA`.
    Elements,
    /// Relationships: `From, To`.
    Connections,
}

impl SheetKind {
    /// Returns the sheet name as used in spreadsheets and log output.
    pub fn name(&self) -> &'static str {
        match self {
            SheetKind::Elements => "Elements",
            SheetKind::Connections => "Connections",
        }
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference to a row of a sheet.
///
/// `number` follows spreadsheet numbering: the header is row 1 and the first
/// data row is row 2. The span covers the row in the sheet source, when the
/// row was read from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowRef {
    sheet: SheetKind,
    number: usize,
    span: Option<Span>,
}

impl RowRef {
    /// Create a new row reference.
    pub fn new(sheet: SheetKind, number: usize, span: Option<Span>) -> Self {
        Self {
            sheet,
            number,
            span,
        }
    }

    /// The sheet the row belongs to.
    pub fn sheet(&self) -> SheetKind {
        self.sheet
    }

    /// Spreadsheet-style 1-based row number.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Source span of the row, if it was read from text.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} row {}", self.sheet, self.number)
    }
}

/// One data record: header name → cell text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    row_ref: RowRef,
    cells: IndexMap<String, String>,
}

impl Row {
    /// Create a row from `(column, value)` pairs.
    ///
    /// This is how record providers other than the CSV reader hand rows to
    /// the normalizer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use relmap_parser::{Row, RowRef, SheetKind};
    /// let row = Row::new(
    ///     RowRef::new(SheetKind::Connections, 2, None),
    ///     [("From", "Lazarus Group"), ("To", "WannaCry")],
    /// );
    /// assert_eq!(row.get("To"), Some("WannaCry"));
    /// assert_eq!(row.get("Label"), None);
    /// ```
    pub fn new<K, V>(row_ref: RowRef, cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            row_ref,
            cells: cells
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Reference to this row for diagnostics.
    pub fn row_ref(&self) -> RowRef {
        self.row_ref
    }

    /// Cell value for `column`, if the row has one.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Iterate over `(column, value)` pairs in header order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// An entity row, validated and with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Unique key of the node; never empty.
    pub label: String,
    /// Entity type, `"Unknown"` when the sheet leaves it blank.
    pub kind: String,
    /// Free-text description, possibly empty.
    pub description: String,
    /// Alternative names, possibly empty.
    pub aka: String,
    /// Where the record came from.
    pub row: RowRef,
}

impl Element {
    /// Create an element with default type, description and AKA.
    pub fn new(label: impl Into<String>, row: RowRef) -> Self {
        Self {
            label: label.into(),
            kind: UNKNOWN_TYPE.to_string(),
            description: String::new(),
            aka: String::new(),
            row,
        }
    }

    /// Set the entity type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the alternative names.
    pub fn with_aka(mut self, aka: impl Into<String>) -> Self {
        self.aka = aka.into();
        self
    }
}

/// A relationship row between two labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Label of one endpoint.
    pub from: String,
    /// Label of the other endpoint.
    pub to: String,
    /// Where the record came from.
    pub row: RowRef,
}

impl Connection {
    /// Create a connection between two labels.
    pub fn new(from: impl Into<String>, to: impl Into<String>, row: RowRef) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            row,
        }
    }
}
