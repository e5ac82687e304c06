//! Data model for tabular data representation

mod schema;
mod table;
mod upload;

pub use schema::{CellType, Column, ColumnSignature};
pub use table::{Row, Table};
pub use upload::{FileSummary, Upload, UploadSet};
