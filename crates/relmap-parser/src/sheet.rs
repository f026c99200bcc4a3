//! CSV sheet reader.
//!
//! Reads the text export of one worksheet into a header and a list of
//! [`Row`]s. The first non-blank record is the header; every later record
//! becomes a row keyed by header name, so the normalizer never depends on
//! column order.
//!
//! The reader recovers from syntax errors: a broken record is reported,
//! skipped up to the end of its line, and reading resumes.

use indexmap::IndexMap;
use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, eof, opt, peek, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    record::{Row, RowRef, SheetKind},
    span::Span,
};

/// Rich diagnostic information for sheet syntax errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SheetDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<SheetDiagnostic>>;

/// Spaces and tabs around a cell.
fn blanks<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(0.., [' ', '\t']).parse_next(input)
}

/// Parse the inside of a quoted cell, turning `""` into `"`.
fn quoted_content(input: &mut Input<'_>) -> IResult<String> {
    repeat(
        0..,
        alt((
            take_while(1.., |c: char| c != '"'),
            literal("\"\"").value("\""),
        )),
    )
    .fold(String::new, |mut acc: String, chunk: &str| {
        acc.push_str(chunk);
        acc
    })
    .parse_next(input)
}

/// Parse a double-quoted cell. Once the opening quote is seen the parser
/// commits, so a missing closing quote is reported instead of backtracking.
fn quoted_field(input: &mut Input<'_>) -> IResult<String> {
    let start = input.current_token_start();

    let value = preceded(
        '"',
        cut_err(terminated(quoted_content, '"')).context(SheetDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated quoted field",
            help: Some("close the cell with a matching `\"`"),
            start,
        }),
    )
    .parse_next(input)?;

    blanks.parse_next(input)?;

    let after_quote = input.current_token_start();
    cut_err(peek(alt((
        literal(","),
        literal("\r"),
        literal("\n"),
        eof,
    ))))
    .context(SheetDiagnostic {
        code: ErrorCode::E002,
        message: "unexpected character after closing quote",
        help: Some("quote the whole cell, escaping inner quotes as `\"\"`"),
        start: after_quote,
    })
    .parse_next(input)?;

    Ok(value)
}

/// Parse an unquoted cell up to the next separator or line end.
fn plain_field(input: &mut Input<'_>) -> IResult<String> {
    take_while(0.., |c: char| c != ',' && c != '\n' && c != '\r')
        .map(|cell: &str| cell.trim().to_string())
        .parse_next(input)
}

fn field(input: &mut Input<'_>) -> IResult<String> {
    blanks.parse_next(input)?;
    alt((quoted_field, plain_field)).parse_next(input)
}

/// Parse one record and its terminator.
///
/// Returns the cells and the end offset of the record, excluding the line
/// terminator.
fn record(input: &mut Input<'_>) -> IResult<(Vec<String>, usize)> {
    let cells: Vec<String> = separated(1.., field, ',').parse_next(input)?;
    let end = input.current_token_start();
    alt((literal("\r\n"), literal("\n"), literal("\r"), eof)).parse_next(input)?;
    Ok((cells, end))
}

/// Skip the rest of the current line, including its terminator.
///
/// Any of `\r\n`, `\n` or a lone `\r` ends the line.
fn skip_line(input: &mut Input<'_>) {
    let line = input
        .offset_for(|c| c == '\r' || c == '\n')
        .unwrap_or_else(|| input.eof_offset());
    input.next_slice(line);

    if input.next_token() == Some('\r') {
        let checkpoint = input.checkpoint();
        if input.next_token() != Some('\n') {
            input.reset(&checkpoint);
        }
    }
}

/// Byte order mark written by some spreadsheet exports.
///
/// Offsets stay relative to the original text, so spans still slice it.
fn byte_order_mark(input: &mut Input<'_>) -> IResult<Option<char>> {
    opt('\u{FEFF}').parse_next(input)
}

/// A parsed worksheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    kind: SheetKind,
    header: Vec<String>,
    header_row: Option<RowRef>,
    rows: Vec<Row>,
    diagnostics: Vec<Diagnostic>,
}

impl Sheet {
    /// Build a sheet from rows provided by something other than the CSV
    /// reader.
    ///
    /// # Examples
    ///
    /// ```
    /// # use relmap_parser::{Row, RowRef, Sheet, SheetKind};
    /// let sheet = Sheet::from_rows(
    ///     SheetKind::Elements,
    ///     vec!["Label".to_string(), "Type".to_string()],
    ///     vec![Row::new(
    ///         RowRef::new(SheetKind::Elements, 2, None),
    ///         [("Label", "Emotet"), ("Type", "Malware")],
    ///     )],
    /// );
    /// assert!(sheet.has_column("Type"));
    /// assert_eq!(sheet.rows().len(), 1);
    /// ```
    pub fn from_rows(kind: SheetKind, header: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            kind,
            header,
            header_row: None,
            rows,
            diagnostics: Vec::new(),
        }
    }

    /// Which sheet this is.
    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    /// Column names in source order.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Where the header record was read from.
    pub fn header_row(&self) -> Option<RowRef> {
        self.header_row
    }

    /// Source span of the header record.
    pub fn header_span(&self) -> Option<Span> {
        self.header_row.and_then(|row| row.span())
    }

    /// Returns `true` if the header names `column`.
    pub fn has_column(&self, column: &str) -> bool {
        self.header.iter().any(|name| name == column)
    }

    /// Data rows in source order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Diagnostics produced while reading the sheet.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Accumulates the header, rows and diagnostics while reading.
struct SheetReader {
    kind: SheetKind,
    header: Option<(Vec<String>, RowRef)>,
    rows: Vec<Row>,
    diagnostics: DiagnosticCollector,
    /// Spreadsheet-style number of the record being read.
    record_number: usize,
}

impl SheetReader {
    fn new(kind: SheetKind) -> Self {
        Self {
            kind,
            header: None,
            rows: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            record_number: 1,
        }
    }

    fn read(&mut self, mut input: Input<'_>) {
        if byte_order_mark(&mut input).is_ok_and(|bom| bom.is_some()) {
            debug!(sheet = self.kind.name(); "Byte order mark skipped");
        }

        while !input.is_empty() {
            let checkpoint = input.checkpoint();
            let start = input.current_token_start();

            match record(&mut input) {
                Ok((cells, end)) => self.accept(cells, Span::new(start..end)),
                Err(err) => {
                    let error_pos = input.current_token_start();
                    let row = RowRef::new(self.kind, self.record_number, None);
                    self.diagnostics
                        .emit(Self::convert_err_mode(err, error_pos).with_row(row));

                    input.reset(&checkpoint);
                    skip_line(&mut input);
                }
            }
            self.record_number += 1;
        }
    }

    fn accept(&mut self, cells: Vec<String>, span: Span) {
        if cells.iter().all(|cell| cell.is_empty()) {
            return;
        }

        let Some((header, _)) = &self.header else {
            self.accept_header(cells, span);
            return;
        };

        let row_ref = RowRef::new(self.kind, self.record_number, Some(span));

        if cells.len() > header.len() && cells[header.len()..].iter().any(|c| !c.is_empty()) {
            self.diagnostics.emit(
                Diagnostic::warning(format!(
                    "{row_ref} has {} cells but the header has {} columns",
                    cells.len(),
                    header.len()
                ))
                .with_code(ErrorCode::E201)
                .with_row(row_ref)
                .with_label(span, "extra cells ignored"),
            );
        }

        let mut mapped = IndexMap::with_capacity(header.len());
        for (column, cell) in header.iter().zip(cells) {
            if !column.is_empty() && !mapped.contains_key(column) {
                mapped.insert(column.clone(), cell);
            }
        }

        self.rows.push(Row::new(row_ref, mapped));
    }

    fn accept_header(&mut self, cells: Vec<String>, span: Span) {
        let row_ref = RowRef::new(self.kind, self.record_number, Some(span));

        for (idx, name) in cells.iter().enumerate() {
            if !name.is_empty() && cells[..idx].contains(name) {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("column `{name}` appears more than once"))
                        .with_code(ErrorCode::E102)
                        .with_row(row_ref)
                        .with_label(span, "duplicate column")
                        .with_help("the first column with this name is used"),
                );
            }
        }

        debug!(sheet = self.kind.name(), columns:? = cells; "Header read");
        self.header = Some((cells, row_ref));
    }

    fn finish(mut self) -> Sheet {
        let (header, header_row) = match self.header {
            Some((header, row)) => (header, Some(row)),
            None => {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("{} sheet has no header row", self.kind))
                        .with_code(ErrorCode::E100)
                        .with_help("the first row must name the columns"),
                );
                (Vec::new(), None)
            }
        };

        Sheet {
            kind: self.kind,
            header,
            header_row,
            rows: self.rows,
            diagnostics: self.diagnostics.into_diagnostics(),
        }
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E002 if no diagnostic context is found.
    fn convert_err_mode(err: ErrMode<ContextError<SheetDiagnostic>>, error_pos: usize) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(SheetDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Read a worksheet from CSV text.
///
/// Never fails: syntax errors are collected as diagnostics on the returned
/// [`Sheet`] and the affected records are skipped.
///
/// # Examples
///
/// ```
/// # use relmap_parser::{parse_sheet, SheetKind};
/// let source = "Type,Label\nMalware,\"Emotet, a.k.a. Geodo\"\n";
/// let sheet = parse_sheet(source, SheetKind::Elements);
///
/// assert!(sheet.diagnostics().is_empty());
/// assert_eq!(sheet.rows()[0].get("Label"), Some("Emotet, a.k.a. Geodo"));
/// ```
pub fn parse_sheet(source: &str, kind: SheetKind) -> Sheet {
    let mut reader = SheetReader::new(kind);
    reader.read(LocatingSlice::new(source));
    let sheet = reader.finish();

    debug!(
        sheet = kind.name(),
        rows = sheet.rows.len(),
        diagnostics = sheet.diagnostics.len();
        "Sheet read"
    );

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements(source: &str) -> Sheet {
        parse_sheet(source, SheetKind::Elements)
    }

    #[test]
    fn test_header_and_rows() {
        let sheet = elements("Label,Type\nA,Person\nB,Org\n");

        assert_eq!(sheet.header(), &["Label".to_string(), "Type".to_string()]);
        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.rows()[1].get("Label"), Some("B"));
        assert_eq!(sheet.rows()[1].get("Type"), Some("Org"));
        assert!(sheet.diagnostics().is_empty());
    }

    #[test]
    fn test_row_numbers_follow_spreadsheet() {
        let sheet = elements("Label\nA\n\nB\n");

        let numbers: Vec<_> = sheet.rows().iter().map(|r| r.row_ref().number()).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_row_spans_exclude_terminator() {
        let source = "Label\r\nAlpha\r\n";
        let sheet = elements(source);

        let span = sheet.rows()[0].row_ref().span().unwrap();
        assert_eq!(&source[span.start()..span.end()], "Alpha");
        assert_eq!(sheet.header_span(), Some(Span::new(0..5)));
    }

    #[test]
    fn test_quoted_cells() {
        let sheet = elements("Label,Description\n\"Trickbot\",\"Banking \"\"trojan\"\", modular\nloader\"\n");

        assert!(sheet.diagnostics().is_empty(), "{:?}", sheet.diagnostics());
        let row = &sheet.rows()[0];
        assert_eq!(row.get("Label"), Some("Trickbot"));
        assert_eq!(
            row.get("Description"),
            Some("Banking \"trojan\", modular\nloader")
        );
    }

    #[test]
    fn test_cells_are_trimmed() {
        let sheet = elements(" Label , Type \n  APT28 ,  Group  \n");

        assert!(sheet.has_column("Label"));
        assert_eq!(sheet.rows()[0].get("Label"), Some("APT28"));
        assert_eq!(sheet.rows()[0].get("Type"), Some("Group"));
    }

    #[test]
    fn test_short_row_lacks_trailing_keys() {
        let sheet = elements("Label,Type,AKA\nA\n");

        let row = &sheet.rows()[0];
        assert_eq!(row.get("Label"), Some("A"));
        assert_eq!(row.get("Type"), None);
        assert_eq!(row.get("AKA"), None);
    }

    #[test]
    fn test_extra_cells_warn() {
        let sheet = elements("Label\nA,surplus\n");

        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.diagnostics().len(), 1);
        let diag = &sheet.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E201));
        assert!(diag.severity().is_warning());
    }

    #[test]
    fn test_duplicate_column_first_wins() {
        let sheet = elements("Label,Label\nfirst,second\n");

        assert_eq!(sheet.rows()[0].get("Label"), Some("first"));
        assert_eq!(sheet.diagnostics()[0].code(), Some(ErrorCode::E102));
    }

    #[test]
    fn test_empty_source_has_no_header() {
        let sheet = elements("");

        assert!(sheet.header().is_empty());
        assert!(sheet.rows().is_empty());
        assert_eq!(sheet.diagnostics().len(), 1);
        assert_eq!(sheet.diagnostics()[0].code(), Some(ErrorCode::E100));
    }

    #[test]
    fn test_unterminated_quote_is_reported() {
        let sheet = elements("Label\n\"Conti\n");

        assert!(sheet.rows().is_empty());
        let diag = sheet
            .diagnostics()
            .iter()
            .find(|d| d.code() == Some(ErrorCode::E001))
            .expect("E001 diagnostic");
        assert!(diag.severity().is_error());
        assert_eq!(diag.row().unwrap().number(), 2);
    }

    #[test]
    fn test_junk_after_quote_recovers_next_line() {
        let sheet = elements("Label\n\"Ryuk\"x\nConti\n");

        assert_eq!(sheet.diagnostics().len(), 1);
        assert_eq!(sheet.diagnostics()[0].code(), Some(ErrorCode::E002));
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0].get("Label"), Some("Conti"));
        assert_eq!(sheet.rows()[0].row_ref().number(), 3);
    }

    #[test]
    fn test_junk_after_quote_recovers_after_bare_cr() {
        let sheet = elements("Label\r\"Ryuk\"x\rConti\rLockBit\r");

        assert_eq!(sheet.diagnostics().len(), 1);
        assert_eq!(sheet.diagnostics()[0].code(), Some(ErrorCode::E002));
        let labels: Vec<_> = sheet.rows().iter().map(|r| r.get("Label")).collect();
        assert_eq!(labels, vec![Some("Conti"), Some("LockBit")]);
        assert_eq!(sheet.rows()[0].row_ref().number(), 3);
    }

    #[test]
    fn test_skip_line_terminators() {
        for (source, rest) in [
            ("junk\r\nnext", "next"),
            ("junk\nnext", "next"),
            ("junk\rnext", "next"),
            ("junk\r\r\nnext", "\r\nnext"),
            ("junk", ""),
        ] {
            let mut input = LocatingSlice::new(source);
            skip_line(&mut input);
            assert_eq!(input.finish(), rest, "{source:?}");
        }
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let source = "\u{FEFF}Label,Type\nA,Person\nB,Org\n";
        let sheet = elements(source);

        assert!(sheet.diagnostics().is_empty(), "{:?}", sheet.diagnostics());
        assert!(sheet.has_column("Label"));
        assert_eq!(sheet.rows().len(), 2);

        let header = sheet.header_span().unwrap();
        assert_eq!(&source[header.start()..header.end()], "Label,Type");
        let first = sheet.rows()[0].row_ref().span().unwrap();
        assert_eq!(&source[first.start()..first.end()], "A,Person");
    }

    #[test]
    fn test_byte_order_mark_only_at_start() {
        let sheet = elements("Label\n\u{FEFF}A\n");
        assert_eq!(sheet.rows()[0].get("Label"), Some("\u{FEFF}A"));
    }

    #[test]
    fn test_no_trailing_newline() {
        let sheet = elements("Label\nA");

        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.rows()[0].get("Label"), Some("A"));
    }
}
