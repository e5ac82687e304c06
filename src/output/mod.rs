//! Output formatting for merge reports and the merged CSV

mod csv;
mod json;
mod terminal;

use std::path::PathBuf;

use anyhow::Result;
use termcolor::WriteColor;

use crate::config::OutputFormat;
use crate::merge::MergeOutcome;
use crate::model::FileSummary;

pub use self::csv::{serialize, CSV_MIME_TYPE};
pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// Where the merged CSV was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    /// Output path; `-` for stdout
    pub path: PathBuf,
    pub bytes: usize,
}

/// Everything a formatter needs to describe one run
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Uploaded files in upload order
    pub files: &'a [FileSummary],
    pub outcome: &'a MergeOutcome,
    /// Maximum number of merged rows to preview
    pub preview_rows: usize,
    /// Set once the merged CSV has been written
    pub written: Option<&'a WrittenOutput>,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a merge report to a writer
    fn render(&self, report: &Report<'_>, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}
