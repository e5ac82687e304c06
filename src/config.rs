//! Configuration handling for csvmerge

use std::path::PathBuf;

/// Filename suggested for the merged output
pub const DEFAULT_OUTPUT_FILENAME: &str = "merged_data.csv";

/// Number of merged rows shown in the preview by default
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Output format for the merge report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(OutputFormat::Terminal),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// How rows whose field count differs from the header are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowLengthPolicy {
    /// Pad short rows with empty cells; reject long rows
    #[default]
    Lenient,
    /// Reject any row whose field count differs from the header
    Strict,
}

/// Configuration for a merge run
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the merged CSV is written (`-` for stdout)
    pub output: PathBuf,
    /// Report format
    pub output_format: OutputFormat,
    /// Number of merged rows shown in the preview
    pub preview_rows: usize,
    /// Handling of short/long rows
    pub row_length: RowLengthPolicy,
    /// Field delimiter; inferred from the file extension when unset
    pub delimiter: Option<u8>,
    /// Validate and report without writing the output
    pub check_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_FILENAME),
            output_format: OutputFormat::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            row_length: RowLengthPolicy::default(),
            delimiter: None,
            check_only: false,
        }
    }
}

impl Config {
    /// Create a new Config writing to the given output path
    pub fn new(output: PathBuf) -> Self {
        Self {
            output,
            ..Default::default()
        }
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Set the row length policy
    pub fn with_row_length(mut self, policy: RowLengthPolicy) -> Self {
        self.row_length = policy;
        self
    }

    /// Force a field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Enable check-only mode
    pub fn with_check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    /// True when the merged CSV goes to stdout
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == "-"
    }
}
