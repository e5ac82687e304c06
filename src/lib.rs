//! csvmerge - Merge CSV files that share the same columns
//!
//! Parses each upload into a [`Table`], checks that every upload has the
//! first upload's column set, concatenates rows in upload order and encodes
//! the result as CSV.

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod output;
pub mod parser;

pub use config::{Config, DEFAULT_OUTPUT_FILENAME};
pub use error::{MergeError, ParseErrorKind};
pub use merge::{
    check_schemas, merge, run_merge, MergeOutcome, MergedTable, SchemaMismatch, SchemaResult,
};
pub use model::{Table, UploadSet};
pub use output::serialize;
pub use parser::parse;
