//! Parser layer for reading delimited text uploads

mod csv;

use crate::config::Config;
use crate::error::MergeError;
use crate::model::Table;

pub use self::csv::CsvParser;

/// Trait for parsing uploaded tabular data
pub trait Parser: Send + Sync {
    /// Parse raw bytes from `filename` into a Table
    fn parse(&self, bytes: &[u8], filename: &str, config: &Config) -> Result<Table, MergeError>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Picks a parser from the upload's file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
    fallback: CsvParser,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(CsvParser::comma()), Box::new(CsvParser::tab())],
            fallback: CsvParser::comma(),
        }
    }

    /// Get a parser for the given filename; unknown extensions are read
    /// as comma separated
    pub fn get_parser(&self, filename: &str) -> &dyn Parser {
        let ext = extension(filename).to_lowercase();
        self.parsers
            .iter()
            .find(|p| p.supports_extension(&ext))
            .map(|p| p.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Parse an upload using the appropriate parser
    pub fn parse(&self, bytes: &[u8], filename: &str, config: &Config) -> Result<Table, MergeError> {
        let parser = self.get_parser(filename);
        parser.parse(bytes, filename, config)
    }
}

/// Parse one upload with the default parser selection
pub fn parse(bytes: &[u8], filename: &str, config: &Config) -> Result<Table, MergeError> {
    ParserFactory::new().parse(bytes, filename, config)
}

fn extension(filename: &str) -> &str {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
}
