//! CSV encoding of a merged table

use crate::error::MergeError;
use crate::model::Table;

/// MIME type the merged output is offered as
pub const CSV_MIME_TYPE: &str = "text/csv";

/// Encode a table as comma separated text.
///
/// Writes the header row then one `\n`-terminated line per row; fields are
/// quoted only when they contain the delimiter, a quote or a line break.
pub fn serialize(table: &Table) -> Result<Vec<u8>, MergeError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.column_names())?;
    for row in &table.rows {
        writer.write_record(&row.cells)?;
    }

    writer.into_inner().map_err(|e| MergeError::Io(e.into_error()))
}
