//! Delimited-text parsing into untyped tables.
//!
//! Bhavcopy and mapping files arrive as headered CSV. This module turns raw
//! bytes into a [`RawTable`] of trimmed headers and string cells; typing and
//! validation happen later, at the normalization boundary.

use csv::{ReaderBuilder, Terminator};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};
use crate::Result;

/// Configuration for CSV parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseConfig {
    /// Field delimiter (default: ',')
    pub delimiter: char,
    /// Quote character (default: '"')
    pub quote_char: char,
    /// Whether to skip rows whose cells are all blank (default: true)
    pub skip_empty_rows: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            skip_empty_rows: true,
        }
    }
}

impl ParseConfig {
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Default::default()
        }
    }

    fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }

    fn quote_byte(&self) -> u8 {
        if self.quote_char.is_ascii() {
            self.quote_char as u8
        } else {
            b'"'
        }
    }
}

/// A headered table of raw string cells.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Problems encountered while reading, none of them fatal.
    pub errors: Vec<ParseIssue>,
}

impl RawTable {
    /// Builds a table from in-memory cells, padding or truncating rows to
    /// the header width.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers
            .into_iter()
            .map(|h| Into::<String>::into(h).trim().to_string())
            .collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<String> = row.into_iter().map(Into::into).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();
        Self {
            headers,
            rows,
            errors: Vec::new(),
        }
    }

    /// Finds a column by name, ignoring case and surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Kind of problem met while reading a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseIssueKind {
    Parse,
    Encoding,
    Structure,
}

/// Non-fatal problem encountered during parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIssue {
    /// Data row index where the problem occurred (if applicable)
    pub row_index: Option<usize>,
    pub message: String,
    pub kind: ParseIssueKind,
}

impl ParseIssue {
    fn parse(row: usize, message: impl Into<String>) -> Self {
        Self {
            row_index: Some(row),
            message: message.into(),
            kind: ParseIssueKind::Parse,
        }
    }

    fn encoding(message: impl Into<String>) -> Self {
        Self {
            row_index: None,
            message: message.into(),
            kind: ParseIssueKind::Encoding,
        }
    }

    fn structure(row: usize, message: impl Into<String>) -> Self {
        Self {
            row_index: Some(row),
            message: message.into(),
            kind: ParseIssueKind::Structure,
        }
    }
}

/// Parses headered CSV content.
///
/// The first non-empty record is the header row. Short rows are padded with
/// empty cells; long rows are truncated and reported.
pub fn parse_csv(content: &[u8], config: &ParseConfig) -> Result<RawTable> {
    let mut errors = Vec::new();
    let text = decode_content(content, &mut errors);

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .quote(config.quote_byte())
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                let row: Vec<String> = record
                    .iter()
                    .map(|cell| cell.trim_end_matches('\r').to_string())
                    .collect();
                if config.skip_empty_rows && row.iter().all(|cell| cell.trim().is_empty()) {
                    continue;
                }
                records.push(row);
            }
            Err(e) => errors.push(ParseIssue::parse(
                idx,
                format!("Failed to parse row {}: {}", idx + 1, e),
            )),
        }
    }

    let mut records = records.into_iter();
    let headers: Vec<String> = match records.next() {
        Some(header_row) => header_row.iter().map(|h| h.trim().to_string()).collect(),
        None => {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "CSV content is empty or contains no valid records".to_string(),
            )))
        }
    };

    let width = headers.len();
    let rows = records
        .enumerate()
        .map(|(idx, mut row)| {
            if row.len() > width {
                errors.push(ParseIssue::structure(
                    idx,
                    format!(
                        "Row {} has {} columns, expected {}. Extra columns ignored.",
                        idx + 1,
                        row.len(),
                        width
                    ),
                ));
                row.truncate(width);
            } else {
                row.resize(width, String::new());
            }
            row
        })
        .collect();

    Ok(RawTable {
        headers,
        rows,
        errors,
    })
}

/// Decodes bytes to UTF-8, dropping a BOM and replacing invalid sequences.
fn decode_content(content: &[u8], errors: &mut Vec<ParseIssue>) -> String {
    let body = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);

    match std::str::from_utf8(body) {
        Ok(s) => s.to_string(),
        Err(e) => {
            errors.push(ParseIssue::encoding(format!(
                "Invalid UTF-8 encoding at byte {}. Some characters may be replaced.",
                e.valid_up_to()
            )));
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nse_bhavcopy() {
        let content = b"SYMBOL,SERIES,CLOSE,TOTTRDQTY,ISIN\nRELIANCE,EQ,2450.5,100,INE002A01018\nTCS,EQ,3900,50,INE467B01029";
        let table = parse_csv(content, &ParseConfig::default()).unwrap();

        assert_eq!(table.headers, vec!["SYMBOL", "SERIES", "CLOSE", "TOTTRDQTY", "ISIN"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][2], "2450.5");
        assert!(table.errors.is_empty());
    }

    #[test]
    fn test_column_index_is_case_insensitive() {
        let table = parse_csv(b" sc_code ,SC_NAME\n500325,RELIANCE", &ParseConfig::default()).unwrap();
        assert_eq!(table.column_index("SC_CODE"), Some(0));
        assert_eq!(table.column_index("sc_name"), Some(1));
        assert_eq!(table.column_index("ISIN"), None);
    }

    #[test]
    fn test_crlf_line_endings() {
        let table = parse_csv(b"A,B\r\n1,2\r\n3,4\r\n", &ParseConfig::default()).unwrap();
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn test_explicit_delimiter() {
        let config = ParseConfig::with_delimiter(';');
        let table = parse_csv(b"A;B\n1;2", &config).unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn test_utf8_bom() {
        let table = parse_csv(b"\xEF\xBB\xBFSC_CODE,ISIN\n500325,INE002A01018", &ParseConfig::default())
            .unwrap();
        assert_eq!(table.headers[0], "SC_CODE");
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let table = parse_csv(b"NAME,CLOSE\nCAF\xFF,10", &ParseConfig::default()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.errors.iter().any(|e| e.kind == ParseIssueKind::Encoding));
    }

    #[test]
    fn test_skip_empty_rows() {
        let table = parse_csv(b"A,B\n1,2\n,\n\n3,4", &ParseConfig::default()).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_uneven_columns() {
        let table = parse_csv(b"a,b,c\n1,2\n3,4,5,6", &ParseConfig::default()).unwrap();

        assert_eq!(table.rows[0], vec!["1", "2", ""]);
        assert_eq!(table.rows[1], vec!["3", "4", "5"]);
        assert!(table.errors.iter().any(|e| e.kind == ParseIssueKind::Structure));
    }

    #[test]
    fn test_empty_content_error() {
        assert!(parse_csv(b"", &ParseConfig::default()).is_err());
        assert!(parse_csv(b"\n\n", &ParseConfig::default()).is_err());
    }

    #[test]
    fn test_from_rows_pads_to_header_width() {
        let table = RawTable::from_rows(["A", "B", "C"], vec![vec!["1"], vec!["2", "3", "4"]]);
        assert_eq!(table.rows[0], vec!["1", "", ""]);
        assert_eq!(table.rows[1].len(), 3);
    }
}
