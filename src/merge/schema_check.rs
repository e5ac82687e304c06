//! Column set comparison across uploads

use serde::Serialize;

use crate::model::UploadSet;

/// Columns of one upload, as listed in a mismatch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileColumns {
    pub filename: String,
    /// Column names in header order
    pub columns: Vec<String>,
    /// Columns of the first upload that this file lacks
    pub missing: Vec<String>,
    /// Columns this file has that the first upload lacks
    pub extra: Vec<String>,
}

impl FileColumns {
    /// True if this file's column set equals the first upload's
    pub fn matches(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Per-file column lists for a set of uploads whose columns differ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaMismatch {
    pub files: Vec<FileColumns>,
}

impl SchemaMismatch {
    /// Files whose columns differ from the first upload's
    pub fn offending_files(&self) -> impl Iterator<Item = &FileColumns> {
        self.files.iter().filter(|f| !f.matches())
    }
}

/// Result of comparing column sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaResult {
    Match,
    Mismatch(SchemaMismatch),
}

impl SchemaResult {
    pub fn is_match(&self) -> bool {
        matches!(self, SchemaResult::Match)
    }
}

/// Compare every upload's column set with the first upload's.
///
/// Column order is ignored; a subset or superset of the first upload's
/// columns is a mismatch. An empty set trivially matches.
pub fn check_schemas(uploads: &UploadSet) -> SchemaResult {
    let Some(first) = uploads.first() else {
        return SchemaResult::Match;
    };
    let reference = first.table.signature();

    let files: Vec<FileColumns> = uploads
        .iter()
        .map(|upload| {
            let signature = upload.table.signature();
            FileColumns {
                filename: upload.filename.clone(),
                columns: upload.table.column_names().map(str::to_string).collect(),
                missing: reference.missing_from(&signature),
                extra: signature.missing_from(&reference),
            }
        })
        .collect();

    if files.iter().all(FileColumns::matches) {
        SchemaResult::Match
    } else {
        SchemaResult::Mismatch(SchemaMismatch { files })
    }
}
