//! Error types for the merge pipeline

use thiserror::Error;

/// Errors reported by the merge pipeline
#[derive(Debug, Error)]
pub enum MergeError {
    /// No input files were supplied
    #[error("no input files were supplied")]
    EmptyInput,

    /// An input file is not valid delimited text
    #[error("failed to parse {filename}")]
    Parse {
        filename: String,
        #[source]
        kind: ParseErrorKind,
    },

    /// The merged table could not be encoded as CSV
    #[error("failed to encode merged CSV")]
    Encode(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MergeError {
    pub(crate) fn parse(filename: impl Into<String>, kind: ParseErrorKind) -> Self {
        MergeError::Parse {
            filename: filename.into(),
            kind,
        }
    }

    /// Name of the file that failed to parse, if any
    pub fn filename(&self) -> Option<&str> {
        match self {
            MergeError::Parse { filename, .. } => Some(filename),
            _ => None,
        }
    }
}

/// Why a single file failed to parse
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("file is empty, no header row found")]
    Empty,

    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: u64 },

    #[error("invalid UTF-8 on line {line}")]
    InvalidUtf8 { line: u64 },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Csv(csv::Error),
}

impl From<csv::Error> for ParseErrorKind {
    fn from(err: csv::Error) -> Self {
        let classified = match err.kind() {
            csv::ErrorKind::Utf8 { pos, .. } => Some(ParseErrorKind::InvalidUtf8 {
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            }),
            csv::ErrorKind::UnequalLengths {
                pos,
                expected_len,
                len,
            } => Some(ParseErrorKind::FieldCount {
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len as usize,
                found: *len as usize,
            }),
            _ => None,
        };
        classified.unwrap_or(ParseErrorKind::Csv(err))
    }
}
