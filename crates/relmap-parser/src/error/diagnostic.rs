//! The core diagnostic type for the relmap error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, the sheet row it concerns, labeled source spans, and help
//! text.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::Label},
    record::RowRef,
    span::Span,
};

/// A structured diagnostic about a rejected or tolerated input row.
///
/// # Example
///
/// ```text
/// error[E200]: row 4 is missing required field `Label`
///   --> elements.csv:4:1
///    |
///  4 | ,Person,Operator of the botnet,
///    | ------------------------------- row skipped
///    |
///    = help: fill in the `Label` column or delete the row
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    row: Option<RowRef>,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use relmap_parser::error::{Diagnostic, ErrorCode};
    /// # use relmap_parser::Span;
    ///
    /// let diag = Diagnostic::error("unterminated quoted field")
    ///     .with_code(ErrorCode::E001)
    ///     .with_label(Span::new(0..10), "quote opened here")
    ///     .with_help("close the field with `\"`");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the sheet row this diagnostic concerns, if any.
    pub fn row(&self) -> Option<RowRef> {
        self.row
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach the sheet row this diagnostic concerns.
    pub fn with_row(mut self, row: RowRef) -> Self {
        self.row = Some(row);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Create a new diagnostic with the given severity and message.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            row: None,
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SheetKind;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(Severity::Error, "test error");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "test error");
        assert!(diag.code().is_none());
        assert!(diag.row().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_row() {
        let row = RowRef::new(SheetKind::Connections, 5, None);
        let diag = Diagnostic::error("missing `To`").with_row(row);

        assert_eq!(diag.row(), Some(row));
        assert_eq!(diag.row().unwrap().sheet(), SheetKind::Connections);
    }

    #[test]
    fn test_diagnostic_with_secondary_label() {
        let diag = Diagnostic::warning("duplicate label")
            .with_label(Span::new(10..20), "this definition wins")
            .with_secondary_label(Span::new(5..15), "first defined here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(diag.labels()[1].is_secondary());
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::new(Severity::Warning, "label `A` is defined multiple times")
            .with_code(ErrorCode::E300);

        assert_eq!(
            diag.to_string(),
            "warning[E300]: label `A` is defined multiple times"
        );
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::new(Severity::Error, "bad row");

        assert_eq!(diag.to_string(), "error: bad row");
    }
}
