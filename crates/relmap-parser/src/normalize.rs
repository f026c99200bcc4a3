//! Record normalization.
//!
//! Maps sheet rows onto typed [`Element`]s and [`Connection`]s. Fields are
//! looked up by column name, so column order in the sheet is irrelevant.
//! A row missing a required field is skipped with an `E200` diagnostic and
//! processing continues with the next row; output keeps input row order.

use log::debug;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    record::{Connection, Element, Row, SheetKind, UNKNOWN_TYPE},
    sheet::Sheet,
};

/// Column names understood by the normalizer.
pub mod columns {
    /// Unique element label.
    pub const LABEL: &str = "Label";
    /// Element type.
    pub const TYPE: &str = "Type";
    /// Element description.
    pub const DESCRIPTION: &str = "Description";
    /// Element alternative names.
    pub const AKA: &str = "AKA";
    /// Connection source label.
    pub const FROM: &str = "From";
    /// Connection target label.
    pub const TO: &str = "To";
}

/// Records accepted from a sheet, plus diagnostics for rejected rows.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    records: Vec<T>,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Normalized<T> {
    /// Accepted records in input row order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Diagnostics for rejected or corrected rows.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Split into records and diagnostics.
    pub fn into_parts(self) -> (Vec<T>, Vec<Diagnostic>) {
        (self.records, self.diagnostics)
    }

    /// Put `diagnostics` ahead of the normalizer's own.
    pub(crate) fn with_leading(mut self, diagnostics: &[Diagnostic]) -> Self {
        self.diagnostics.splice(0..0, diagnostics.iter().cloned());
        self
    }
}

/// Returns `true` when every `required` column is in the header.
///
/// Emits one `E101` for the header otherwise, so rows are not reported
/// one by one for a problem that is really in the header.
fn check_columns(sheet: &Sheet, required: &[&str], diagnostics: &mut DiagnosticCollector) -> bool {
    // An empty sheet was already reported while reading it.
    if sheet.header().is_empty() && sheet.rows().is_empty() {
        return false;
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !sheet.has_column(column))
        .collect();
    if missing.is_empty() {
        return true;
    }

    let mut diag = Diagnostic::error(format!(
        "{} sheet has no {} column",
        sheet.kind(),
        quote_list(&missing)
    ))
    .with_code(ErrorCode::E101)
    .with_help(format!(
        "the header must name the columns {}",
        quote_list(required)
    ));
    if let Some(row) = sheet.header_row() {
        diag = diag.with_row(row);
    }
    if let Some(span) = sheet.header_span() {
        diag = diag.with_label(span, format!("{} rows skipped", sheet.rows().len()));
    }
    diagnostics.emit(diag);
    false
}

/// Extract the `required` fields of a row, trimmed and non-empty.
///
/// Emits `E200` naming every missing field and returns `None` if any is
/// absent or blank.
fn required_fields<'r, const N: usize>(
    row: &'r Row,
    required: [&str; N],
    diagnostics: &mut DiagnosticCollector,
) -> Option<[&'r str; N]> {
    let mut values = [""; N];
    let mut missing = Vec::new();

    for (slot, column) in values.iter_mut().zip(required) {
        match row.get(column).map(str::trim) {
            Some(value) if !value.is_empty() => *slot = value,
            _ => missing.push(column),
        }
    }

    if missing.is_empty() {
        return Some(values);
    }

    let row_ref = row.row_ref();
    let noun = if missing.len() == 1 { "field" } else { "fields" };
    let mut diag = Diagnostic::error(format!(
        "{row_ref} is missing required {noun} {}",
        quote_list(&missing)
    ))
    .with_code(ErrorCode::E200)
    .with_row(row_ref)
    .with_help(format!("fill in {} or delete the row", quote_list(&missing)));
    if let Some(span) = row_ref.span() {
        diag = diag.with_label(span, "row skipped");
    }
    diagnostics.emit(diag);
    None
}

/// Trimmed value of an optional field, or `default` when absent or blank.
fn optional_field<'r>(row: &'r Row, column: &str, default: &'r str) -> &'r str {
    match row.get(column).map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn quote_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("`{column}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Normalize the rows of an Elements sheet.
///
/// `Label` is required; `Type` defaults to `"Unknown"`, `Description` and
/// `AKA` default to empty strings.
///
/// # Examples
///
/// ```
/// # use relmap_parser::{normalize_elements, parse_sheet, SheetKind};
/// let sheet = parse_sheet("Type,Label\nPerson,A\nOrg,\n", SheetKind::Elements);
/// let normalized = normalize_elements(&sheet);
///
/// assert_eq!(normalized.records().len(), 1);
/// assert_eq!(normalized.records()[0].label, "A");
/// assert_eq!(normalized.diagnostics().len(), 1);
/// ```
pub fn normalize_elements(sheet: &Sheet) -> Normalized<Element> {
    let mut diagnostics = DiagnosticCollector::new();
    let mut records = Vec::new();

    if check_columns(sheet, &[columns::LABEL], &mut diagnostics) {
        for row in sheet.rows() {
            let Some([label]) = required_fields(row, [columns::LABEL], &mut diagnostics) else {
                continue;
            };

            records.push(
                Element::new(label, row.row_ref())
                    .with_kind(optional_field(row, columns::TYPE, UNKNOWN_TYPE))
                    .with_description(optional_field(row, columns::DESCRIPTION, ""))
                    .with_aka(optional_field(row, columns::AKA, "")),
            );
        }
    }

    debug!(
        sheet = SheetKind::Elements.name(),
        accepted = records.len(),
        rejected = sheet.rows().len() - records.len();
        "Rows normalized"
    );

    Normalized {
        records,
        diagnostics: diagnostics.into_diagnostics(),
    }
}

/// Normalize the rows of a Connections sheet.
///
/// Both `From` and `To` are required.
pub fn normalize_connections(sheet: &Sheet) -> Normalized<Connection> {
    let mut diagnostics = DiagnosticCollector::new();
    let mut records = Vec::new();

    if check_columns(sheet, &[columns::FROM, columns::TO], &mut diagnostics) {
        for row in sheet.rows() {
            let Some([from, to]) =
                required_fields(row, [columns::FROM, columns::TO], &mut diagnostics)
            else {
                continue;
            };

            records.push(Connection::new(from, to, row.row_ref()));
        }
    }

    debug!(
        sheet = SheetKind::Connections.name(),
        accepted = records.len(),
        rejected = sheet.rows().len() - records.len();
        "Rows normalized"
    );

    Normalized {
        records,
        diagnostics: diagnostics.into_diagnostics(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record::RowRef, sheet::parse_sheet};

    #[test]
    fn test_elements_defaults() {
        let sheet = parse_sheet("Label,Type,Description,AKA\nA,,,\nB\n", SheetKind::Elements);
        let normalized = normalize_elements(&sheet);

        assert!(normalized.diagnostics().is_empty());
        let records = normalized.records();
        assert_eq!(records.len(), 2);
        for element in records {
            assert_eq!(element.kind, UNKNOWN_TYPE);
            assert_eq!(element.description, "");
            assert_eq!(element.aka, "");
        }
    }

    #[test]
    fn test_elements_column_order_irrelevant() {
        let sheet = parse_sheet(
            "AKA,Description,Type,Label\nHidden Cobra,North Korean APT,Group,Lazarus Group\n",
            SheetKind::Elements,
        );
        let binding = normalize_elements(&sheet);
        let element = &binding.records()[0];

        assert_eq!(element.label, "Lazarus Group");
        assert_eq!(element.kind, "Group");
        assert_eq!(element.description, "North Korean APT");
        assert_eq!(element.aka, "Hidden Cobra");
    }

    #[test]
    fn test_missing_label_rejected_and_order_preserved() {
        let sheet = parse_sheet("Label,Type\nA,Person\n  ,Org\nC,Malware\n", SheetKind::Elements);
        let (records, diagnostics) = normalize_elements(&sheet).into_parts();

        let labels: Vec<_> = records.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "C"]);

        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics[0];
        assert_eq!(diag.code(), Some(ErrorCode::E200));
        assert_eq!(diag.row().unwrap().number(), 3);
        assert!(diag.message().contains("`Label`"));
    }

    #[test]
    fn test_missing_label_column_reports_once() {
        let sheet = parse_sheet("Name,Type\nA,Person\nB,Org\n", SheetKind::Elements);
        let normalized = normalize_elements(&sheet);

        assert!(normalized.records().is_empty());
        assert_eq!(normalized.diagnostics().len(), 1);
        assert_eq!(normalized.diagnostics()[0].code(), Some(ErrorCode::E101));
    }

    #[test]
    fn test_empty_sheet_adds_nothing() {
        let sheet = parse_sheet("", SheetKind::Elements);
        let normalized = normalize_elements(&sheet);

        assert!(normalized.records().is_empty());
        assert!(normalized.diagnostics().is_empty());
    }

    #[test]
    fn test_connections_require_both_endpoints() {
        let sheet = parse_sheet("From,To\nA,B\nA,\n,\nC,D\n", SheetKind::Connections);
        let (records, diagnostics) = normalize_connections(&sheet).into_parts();

        assert_eq!(records.len(), 2);
        assert_eq!((records[0].from.as_str(), records[0].to.as_str()), ("A", "B"));
        assert_eq!((records[1].from.as_str(), records[1].to.as_str()), ("C", "D"));

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message().contains("field `To`"));
        assert!(diagnostics[1].message().contains("fields `From`, `To`"));
    }

    #[test]
    fn test_connections_from_programmatic_rows() {
        let row = |n, from: &str, to: &str| {
            Row::new(
                RowRef::new(SheetKind::Connections, n, None),
                [("To", to), ("From", from)],
            )
        };
        let sheet = Sheet::from_rows(
            SheetKind::Connections,
            vec!["To".into(), "From".into()],
            vec![row(2, "X", "Y"), row(3, "Y", "Y")],
        );
        let records = normalize_connections(&sheet).into_parts().0;

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].from, records[1].to);
    }
}
