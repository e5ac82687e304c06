//! Named tables in upload order

use serde::Serialize;

use crate::config::Config;
use crate::error::MergeError;
use crate::parser::ParserFactory;

use super::table::Table;

/// One parsed input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub table: Table,
}

/// Listing entry for one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Parsed input files, kept in upload order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSet {
    uploads: Vec<Upload>,
}

impl UploadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `(filename, bytes)` source in order.
    ///
    /// Stops at the first file that fails to parse.
    pub fn parse_all<I, N, B>(sources: I, config: &Config) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: AsRef<[u8]>,
    {
        let factory = ParserFactory::new();
        let mut set = Self::new();
        for (filename, bytes) in sources {
            let filename = filename.into();
            let table = factory.parse(bytes.as_ref(), &filename, config)?;
            set.push(filename, table);
        }
        Ok(set)
    }

    /// Append a table after the ones already present
    pub fn push(&mut self, filename: impl Into<String>, table: Table) {
        self.uploads.push(Upload {
            filename: filename.into(),
            table,
        });
    }

    pub fn first(&self) -> Option<&Upload> {
        self.uploads.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Upload> {
        self.uploads.iter()
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    /// Filename, row count and columns of each upload
    pub fn summaries(&self) -> Vec<FileSummary> {
        self.uploads
            .iter()
            .map(|u| FileSummary {
                filename: u.filename.clone(),
                rows: u.table.row_count(),
                columns: u.table.column_names().map(str::to_string).collect(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a UploadSet {
    type Item = &'a Upload;
    type IntoIter = std::slice::Iter<'a, Upload>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
