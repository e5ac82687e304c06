//! Delimited text parser

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::config::{Config, RowLengthPolicy};
use crate::error::{MergeError, ParseErrorKind};
use crate::model::{Column, Row, Table};

use super::Parser;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const QUOTE: u8 = b'"';

/// Parser for comma/tab separated uploads
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
}

impl CsvParser {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    pub fn comma() -> Self {
        Self::new(b',')
    }

    pub fn tab() -> Self {
        Self::new(b'\t')
    }
}

impl Parser for CsvParser {
    fn parse(&self, bytes: &[u8], filename: &str, config: &Config) -> Result<Table, MergeError> {
        let delimiter = config.delimiter.unwrap_or(self.delimiter);
        let data = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let fail = |kind: ParseErrorKind| MergeError::parse(filename, kind);

        // The csv reader accepts an unclosed quote at EOF, so check for it first
        if let Some(line) = unterminated_quote_line(data, delimiter) {
            return Err(fail(ParseErrorKind::UnterminatedQuote { line }));
        }

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .quote(QUOTE)
            .from_reader(data);

        let headers = csv_reader
            .headers()
            .map_err(|e| fail(e.into()))?
            .clone();
        if headers.is_empty() {
            return Err(fail(ParseErrorKind::Empty));
        }

        let columns: Vec<Column> = header_names(headers.iter())
            .into_iter()
            .enumerate()
            .map(|(i, name)| Column::new(name, i))
            .collect();
        let mut table = Table::new(columns);
        let expected = table.column_count();
        let mut padded = 0usize;

        for result in csv_reader.records() {
            let record = result.map_err(|e| fail(e.into()))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let found = record.len();

            if found > expected
                || (found < expected && config.row_length == RowLengthPolicy::Strict)
            {
                return Err(fail(ParseErrorKind::FieldCount {
                    line,
                    expected,
                    found,
                }));
            }

            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if found < expected {
                cells.resize(expected, String::new());
                padded += 1;
            }
            table.add_row(Row::new(cells));
        }

        if padded > 0 {
            warn!(
                filename,
                rows = padded,
                "padded short rows with empty cells"
            );
        }

        table.infer_column_types();
        debug!(
            filename,
            rows = table.row_count(),
            columns = table.column_count(),
            "parsed upload"
        );

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        match self.delimiter {
            b'\t' => matches!(ext, "tsv" | "tab"),
            b',' => matches!(ext, "csv" | "txt"),
            _ => false,
        }
    }
}

/// Header names with blanks filled in and duplicates made unique
fn header_names<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let raw: Vec<String> = raw
        .enumerate()
        .map(|(i, name)| {
            if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.to_string()
            }
        })
        .collect();

    let mut taken: FxHashSet<String> = FxHashSet::default();
    let mut names = Vec::with_capacity(raw.len());
    for name in &raw {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) || (suffix > 1 && raw.contains(&candidate)) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

/// Line on which a quoted field opens without ever closing.
///
/// A quote only opens a field when it is the field's first byte; inside a
/// quoted field a doubled quote is an escaped quote.
fn unterminated_quote_line(data: &[u8], delimiter: u8) -> Option<u64> {
    let mut line = 1u64;
    let mut field_start = true;
    let mut open_at: Option<u64> = None;
    let mut bytes = data.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if open_at.is_some() {
            match b {
                QUOTE if bytes.peek() == Some(&QUOTE) => {
                    bytes.next();
                }
                QUOTE => open_at = None,
                b'\n' => line += 1,
                _ => {}
            }
            continue;
        }

        match b {
            QUOTE if field_start => {
                open_at = Some(line);
                field_start = false;
            }
            b'\n' => {
                line += 1;
                field_start = true;
            }
            b'\r' => field_start = true,
            _ if b == delimiter => field_start = true,
            _ => field_start = false,
        }
    }

    open_at
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Table, MergeError> {
        CsvParser::comma().parse(input.as_bytes(), "test.csv", &Config::default())
    }

    fn parse_kind(input: &str, config: &Config) -> ParseErrorKind {
        match CsvParser::comma().parse(input.as_bytes(), "test.csv", config) {
            Err(MergeError::Parse { filename, kind }) => {
                assert_eq!(filename, "test.csv");
                kind
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_basic() {
        let table = parse("id,name\n1,Al\n2,Bo\n").unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].cells, vec!["2", "Bo"]);
    }

    #[test]
    fn test_cells_are_kept_verbatim() {
        let table = parse("id,note\n007,\" padded \"\n").unwrap();
        assert_eq!(table.rows[0].cells, vec!["007", " padded "]);
    }

    #[test]
    fn test_quoted_fields() {
        let table = parse("id,note\n1,\"a, b\"\n2,\"say \"\"hi\"\"\"\n3,\"two\nlines\"\n").unwrap();
        assert_eq!(table.rows[0].get(1), Some("a, b"));
        assert_eq!(table.rows[1].get(1), Some("say \"hi\""));
        assert_eq!(table.rows[2].get(1), Some("two\nlines"));
    }

    #[test]
    fn test_bom_and_crlf() {
        let table = parse("\u{feff}id,name\r\n1,Al\r\n").unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(table.rows[0].cells, vec!["1", "Al"]);
    }

    #[test]
    fn test_header_only() {
        let table = parse("id,name\n").unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_kind("", &Config::default()), ParseErrorKind::Empty));
    }

    #[test]
    fn test_unterminated_quote() {
        let kind = parse_kind("id,note\n1,ok\n2,\"never closed\n3,x\n", &Config::default());
        assert!(matches!(kind, ParseErrorKind::UnterminatedQuote { line: 3 }));
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let table = parse("id,size\n1,5\" pipe\n").unwrap();
        assert_eq!(table.rows[0].get(1), Some("5\" pipe"));
    }

    #[test]
    fn test_short_row_padded_when_lenient() {
        let table = parse("a,b,c\n1,2\n").unwrap();
        assert_eq!(table.rows[0].cells, vec!["1", "2", ""]);
    }

    #[test]
    fn test_short_row_rejected_when_strict() {
        let config = Config::default().with_row_length(RowLengthPolicy::Strict);
        let kind = parse_kind("a,b,c\n1,2,3\n1,2\n", &config);
        assert!(matches!(
            kind,
            ParseErrorKind::FieldCount {
                line: 3,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_long_row_always_rejected() {
        let kind = parse_kind("a,b\n1,2,3\n", &Config::default());
        assert!(matches!(
            kind,
            ParseErrorKind::FieldCount {
                line: 2,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = b"id,name\n1,\xff\xfe\n";
        let err = CsvParser::comma()
            .parse(bytes, "bad.csv", &Config::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MergeError::Parse {
                kind: ParseErrorKind::InvalidUtf8 { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_header_names() {
        let names = header_names(["id", "", "id", "id", "name"].into_iter());
        assert_eq!(names, vec!["id", "Unnamed: 1", "id.1", "id.2", "name"]);
    }

    #[test]
    fn test_unterminated_quote_line() {
        assert_eq!(unterminated_quote_line(b"a,\"b\"\"c\"\n", b','), None);
        assert_eq!(unterminated_quote_line(b"a\n\"b\"\"\n", b','), Some(2));
        assert_eq!(unterminated_quote_line(b"a;\"b\n", b';'), Some(1));
    }
}
