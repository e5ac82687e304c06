//! Colored terminal output

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::merge::{FileColumns, MergeOutcome, MergedTable, SchemaMismatch};
use crate::model::{FileSummary, Table};

use super::{OutputFormatter, Report, WrittenOutput};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Terminal report with colored status lines and a preview table
pub struct TerminalOutput {
    /// Preview cells longer than this are cut short
    max_cell_width: usize,
}

impl TerminalOutput {
    pub fn new() -> Self {
        Self { max_cell_width: 40 }
    }

    pub fn with_max_cell_width(max_cell_width: usize) -> Self {
        Self { max_cell_width }
    }

    fn write_header(&self, files: &[FileSummary], writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(writer, "{}", RULE)?;
        writeln!(writer, " csvmerge: {} file(s) uploaded", files.len())?;
        writeln!(writer, "{}", RULE)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_files(&self, files: &[FileSummary], writer: &mut dyn WriteColor) -> Result<()> {
        writeln!(writer, "Uploaded Files:")?;
        for file in files {
            writeln!(writer, "  {} - {} rows", file.filename, file.rows)?;
            writeln!(writer, "    Columns: {}", file.columns.join(", "))?;
        }
        writeln!(writer)?;
        Ok(())
    }

    fn write_mismatch(&self, mismatch: &SchemaMismatch, writer: &mut dyn WriteColor) -> Result<()> {
        write_status(writer, Color::Red, "✘ Not all files have the same columns!")?;
        writeln!(writer)?;
        writeln!(writer, "Column comparison:")?;
        for file in &mismatch.files {
            writeln!(
                writer,
                "  - {}: {}{}",
                file.filename,
                file.columns.join(", "),
                difference_note(file)
            )?;
        }
        Ok(())
    }

    fn write_merged(
        &self,
        merged: &MergedTable,
        preview_rows: usize,
        written: Option<&WrittenOutput>,
        writer: &mut dyn WriteColor,
    ) -> Result<()> {
        write_status(writer, Color::Green, "✔ All files have matching columns!")?;
        writeln!(writer)?;

        writeln!(
            writer,
            "Total Files: {} | Total Rows: {} | Columns: {}",
            merged.file_count(),
            merged.row_count(),
            merged.column_count()
        )?;
        let typed: Vec<String> = merged
            .table
            .columns
            .iter()
            .map(|c| format!("{} ({})", c.name, c.inferred_type))
            .collect();
        writeln!(writer, "  {}", typed.join(", "))?;
        writeln!(writer)?;

        if preview_rows > 0 {
            let shown = preview_rows.min(merged.row_count());
            writeln!(
                writer,
                "Preview (showing {} of {} rows):",
                shown,
                merged.row_count()
            )?;
            writeln!(writer, "{}", self.preview_table(&merged.table, shown))?;
            writeln!(writer)?;
        }

        match written {
            Some(output) if output.path.as_os_str() == "-" => {
                writeln!(writer, "Merged CSV written to stdout ({} bytes)", output.bytes)?
            }
            Some(output) => writeln!(
                writer,
                "Merged CSV written to {} ({} bytes)",
                output.path.display(),
                output.bytes
            )?,
            None => writeln!(writer, "Check only: merged CSV not written")?,
        }
        Ok(())
    }

    /// Render the first `limit` rows with a 0-based index column
    fn preview_table(&self, table: &Table, limit: usize) -> String {
        let mut builder = Builder::default();
        builder.push_record(
            std::iter::once(String::new()).chain(table.column_names().map(str::to_string)),
        );
        for (index, row) in table.rows.iter().take(limit).enumerate() {
            builder.push_record(
                std::iter::once(index.to_string())
                    .chain(row.cells.iter().map(|c| self.display_cell(c))),
            );
        }

        let mut preview = builder.build();
        preview.with(Style::modern());
        preview.to_string()
    }

    fn display_cell(&self, cell: &str) -> String {
        let flat = cell.replace("\r\n", "⏎").replace(['\n', '\r'], "⏎");
        if flat.chars().count() <= self.max_cell_width {
            return flat;
        }
        let mut cut: String = flat.chars().take(self.max_cell_width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, report: &Report<'_>, writer: &mut dyn WriteColor) -> Result<()> {
        self.write_header(report.files, writer)?;
        self.write_files(report.files, writer)?;

        match report.outcome {
            MergeOutcome::Merged(merged) => {
                self.write_merged(merged, report.preview_rows, report.written, writer)
            }
            MergeOutcome::Mismatch(mismatch) => self.write_mismatch(mismatch, writer),
        }
    }
}

fn write_status(writer: &mut dyn WriteColor, color: Color, text: &str) -> Result<()> {
    writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(writer, "{}", text)?;
    writer.reset()?;
    writeln!(writer)?;
    Ok(())
}

fn difference_note(file: &FileColumns) -> String {
    let mut parts = Vec::new();
    if !file.missing.is_empty() {
        parts.push(format!("missing: {}", file.missing.join(", ")));
    }
    if !file.extra.is_empty() {
        parts.push(format!("extra: {}", file.extra.join(", ")));
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join("; "))
    }
}
