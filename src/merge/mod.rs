//! Merge engine: schema check and row concatenation

mod schema_check;

use serde::Serialize;
use tracing::debug;

use crate::error::MergeError;
use crate::model::{Row, Table, UploadSet};

pub use schema_check::{check_schemas, FileColumns, SchemaMismatch, SchemaResult};

/// Where one upload's rows landed in the merged table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    pub filename: String,
    /// Index of the upload's first row in the merged table
    pub first_row: usize,
    pub rows: usize,
}

/// The rows of every upload concatenated in upload order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    pub table: Table,
    pub sources: Vec<SourceSpan>,
}

impl MergedTable {
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.table.column_count()
    }

    pub fn file_count(&self) -> usize {
        self.sources.len()
    }
}

/// Outcome of a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Merged(MergedTable),
    Mismatch(SchemaMismatch),
}

/// Concatenate the rows of every upload.
///
/// Columns follow the first upload's order; cells of later uploads are
/// re-ordered by column name.
///
/// # Panics
///
/// Panics if the uploads do not share the first upload's column set; run
/// [`check_schemas`] first.
pub fn merge(uploads: &UploadSet) -> MergedTable {
    assert!(
        check_schemas(uploads).is_match(),
        "merge called on uploads with mismatched columns"
    );
    let Some(first) = uploads.first() else {
        return MergedTable::default();
    };

    let names: Vec<&str> = first.table.column_names().collect();
    let mut table = Table::with_headers(names.iter().copied());
    let mut sources = Vec::with_capacity(uploads.len());

    for upload in uploads {
        let positions: Vec<usize> = names
            .iter()
            .filter_map(|name| upload.table.column_index(name))
            .collect();
        let first_row = table.row_count();

        for row in &upload.table.rows {
            table.add_row(
                positions
                    .iter()
                    .map(|&i| row.get(i).unwrap_or_default())
                    .collect::<Row>(),
            );
        }

        sources.push(SourceSpan {
            filename: upload.filename.clone(),
            first_row,
            rows: upload.table.row_count(),
        });
    }

    table.infer_column_types();
    debug!(
        files = sources.len(),
        rows = table.row_count(),
        columns = table.column_count(),
        "merged uploads"
    );

    MergedTable { table, sources }
}

/// Check column sets and merge when they agree
pub fn run_merge(uploads: &UploadSet) -> Result<MergeOutcome, MergeError> {
    if uploads.is_empty() {
        return Err(MergeError::EmptyInput);
    }

    match check_schemas(uploads) {
        SchemaResult::Match => Ok(MergeOutcome::Merged(merge(uploads))),
        SchemaResult::Mismatch(mismatch) => {
            debug!(
                offending = mismatch.offending_files().count(),
                "column sets differ, merge skipped"
            );
            Ok(MergeOutcome::Mismatch(mismatch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse;

    fn uploads(files: &[(&str, &str)]) -> UploadSet {
        UploadSet::parse_all(files.iter().copied(), &Config::default()).unwrap()
    }

    fn cells(table: &Table) -> Vec<Vec<String>> {
        table.rows.iter().map(|r| r.cells.clone()).collect()
    }

    #[test]
    fn test_merge_concatenates_in_upload_order() {
        let set = uploads(&[
            ("A.csv", "id,name\n1,Al\n2,Bo\n"),
            ("B.csv", "id,name\n3,Cy\n"),
        ]);
        let merged = merge(&set);

        assert_eq!(merged.row_count(), 3);
        assert_eq!(
            merged.table.column_names().collect::<Vec<_>>(),
            vec!["id", "name"]
        );
        assert_eq!(
            cells(&merged.table),
            vec![vec!["1", "Al"], vec!["2", "Bo"], vec!["3", "Cy"]]
        );
    }

    #[test]
    fn test_merge_reorders_cells_to_first_file_columns() {
        let set = uploads(&[
            ("a.csv", "id,name\n1,Al\n"),
            ("b.csv", "name,id\nBo,2\n"),
        ]);
        let merged = merge(&set);

        assert_eq!(
            merged.table.column_names().collect::<Vec<_>>(),
            vec!["id", "name"]
        );
        assert_eq!(cells(&merged.table), vec![vec!["1", "Al"], vec!["2", "Bo"]]);
    }

    #[test]
    fn test_row_count_is_sum_of_inputs() {
        let set = uploads(&[
            ("a.csv", "x,y\n1,2\n3,4\n"),
            ("b.csv", "x,y\n"),
            ("c.csv", "y,x\n5,6\n7,8\n9,10\n"),
        ]);
        let expected: usize = set.iter().map(|u| u.table.row_count()).sum();
        assert_eq!(merge(&set).row_count(), expected);
    }

    #[test]
    fn test_source_spans() {
        let set = uploads(&[
            ("a.csv", "id\n1\n2\n"),
            ("b.csv", "id\n"),
            ("c.csv", "id\n3\n"),
        ]);
        let merged = merge(&set);

        let spans: Vec<_> = merged
            .sources
            .iter()
            .map(|s| (s.filename.as_str(), s.first_row, s.rows))
            .collect();
        assert_eq!(spans, vec![("a.csv", 0, 2), ("b.csv", 2, 0), ("c.csv", 2, 1)]);
    }

    #[test]
    fn test_single_file_merge_is_identity() {
        let data = "id,name,joined\n1,Al,2024-01-01\n2,,2024-02-01\n";
        let set = uploads(&[("only.csv", data)]);
        let merged = merge(&set);

        let original = parse(data.as_bytes(), "only.csv", &Config::default()).unwrap();
        assert_eq!(merged.table, original);
    }

    #[test]
    #[should_panic(expected = "mismatched columns")]
    fn test_merge_panics_on_mismatch() {
        let set = uploads(&[("a.csv", "id\n1\n"), ("b.csv", "key\n2\n")]);
        merge(&set);
    }

    #[test]
    fn test_run_merge_reports_mismatch() {
        let set = uploads(&[("A.csv", "id,name\n1,Al\n"), ("B.csv", "id,email\n2,b@x\n")]);
        let MergeOutcome::Mismatch(mismatch) = run_merge(&set).unwrap() else {
            panic!("expected mismatch");
        };
        assert_eq!(mismatch.files[0].columns, vec!["id", "name"]);
        assert_eq!(mismatch.files[1].columns, vec!["id", "email"]);
    }

    #[test]
    fn test_run_merge_empty_input() {
        let err = run_merge(&UploadSet::new()).unwrap_err();
        assert!(matches!(err, MergeError::EmptyInput));
    }
}
