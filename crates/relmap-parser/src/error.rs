//! Diagnostic system for sheet reading, normalization and graph building.
//!
//! This module provides:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - A row reference tying each diagnostic to a sheet row
//! - Diagnostic collector for accumulating multiple diagnostics
//!
//! # Overview
//!
//! Nothing in the pipeline aborts on a bad row. Every rejected or tolerated
//! input produces a [`Diagnostic`]; callers decide whether to log them or,
//! in strict mode, to fail with a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use relmap_parser::error::{Diagnostic, ErrorCode};
//! # use relmap_parser::{RowRef, SheetKind, Span};
//!
//! let row = RowRef::new(SheetKind::Elements, 7, Some(Span::new(120..141)));
//! let first = Span::new(40..58);
//!
//! let diag = Diagnostic::warning("label `Conti` is defined multiple times")
//!     .with_code(ErrorCode::E300)
//!     .with_row(row)
//!     .with_label(Span::new(120..141), "this definition wins")
//!     .with_secondary_label(first, "first defined here");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
