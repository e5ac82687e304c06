//! JSON output format

use std::io::Write;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use termcolor::WriteColor;

use crate::merge::{FileColumns, MergeOutcome, SourceSpan};
use crate::model::{Column, FileSummary};

use super::{OutputFormatter, Report, CSV_MIME_TYPE};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum JsonReport<'a> {
    Merged {
        files: &'a [FileSummary],
        total_files: usize,
        total_rows: usize,
        columns: &'a [Column],
        sources: &'a [SourceSpan],
        preview: Vec<IndexMap<&'a str, &'a str>>,
        output: Option<JsonOutputFile>,
    },
    Mismatch {
        files: &'a [FileSummary],
        comparison: &'a [FileColumns],
    },
}

#[derive(Serialize)]
struct JsonOutputFile {
    path: String,
    bytes: usize,
    mime_type: &'static str,
}

impl OutputFormatter for JsonOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        let output = match report.outcome {
            MergeOutcome::Merged(merged) => {
                let names: Vec<&str> = merged.table.column_names().collect();
                let preview = merged
                    .table
                    .rows
                    .iter()
                    .take(report.preview_rows)
                    .map(|row| {
                        names
                            .iter()
                            .copied()
                            .zip(row.cells.iter().map(String::as_str))
                            .collect()
                    })
                    .collect();

                JsonReport::Merged {
                    files: report.files,
                    total_files: merged.file_count(),
                    total_rows: merged.row_count(),
                    columns: &merged.table.columns,
                    sources: &merged.sources,
                    preview,
                    output: report.written.map(|w| JsonOutputFile {
                        path: w.path.display().to_string(),
                        bytes: w.bytes,
                        mime_type: CSV_MIME_TYPE,
                    }),
                }
            }
            MergeOutcome::Mismatch(mismatch) => JsonReport::Mismatch {
                files: report.files,
                comparison: &mismatch.files,
            },
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &output)?;
        } else {
            serde_json::to_writer(&mut *writer, &output)?;
        }
        writeln!(writer)?;

        Ok(())
    }
}
