//! csvmerge - Merge CSV files that share the same columns

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use termcolor::{ColorChoice, StandardStream};
use tracing::info;
use tracing_subscriber::EnvFilter;

use csvmerge::config::{
    Config, OutputFormat, RowLengthPolicy, DEFAULT_OUTPUT_FILENAME, DEFAULT_PREVIEW_ROWS,
};
use csvmerge::merge::{run_merge, MergeOutcome};
use csvmerge::output::{serialize, OutputFactory, OutputFormatter, Report, WrittenOutput};
use csvmerge::{MergeError, UploadSet};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Merge CSV files that share the same columns into one file
#[derive(Parser, Debug)]
#[command(name = "csvmerge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV files to merge, in the order their rows should appear
    files: Vec<PathBuf>,

    /// Output filename ("-" writes the merged CSV to stdout)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Number of merged rows to preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Reject rows with fewer fields than the header instead of padding them
    #[arg(long)]
    strict: bool,

    /// Field delimiter (single ASCII character or "tab"); inferred from the
    /// file extension by default
    #[arg(short, long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    /// Validate and report without writing the merged file
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

enum Status {
    Merged,
    Mismatch,
    NoInput,
}

fn main() -> ExitCode {
    match run() {
        Ok(Status::Merged) | Ok(Status::NoInput) => ExitCode::SUCCESS,
        Ok(Status::Mismatch) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<Status> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::new(cli.output)
        .with_output_format(cli.format.into())
        .with_preview_rows(cli.preview_rows)
        .with_row_length(if cli.strict {
            RowLengthPolicy::Strict
        } else {
            RowLengthPolicy::Lenient
        })
        .with_check_only(cli.check);
    if let Some(delimiter) = cli.delimiter {
        config = config.with_delimiter(delimiter);
    }

    // Read uploads
    let mut sources = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        sources.push((upload_name(path), bytes));
    }

    let uploads = UploadSet::parse_all(sources, &config)?;
    let outcome = match run_merge(&uploads) {
        Ok(outcome) => outcome,
        Err(MergeError::EmptyInput) => {
            print_instructions();
            return Ok(Status::NoInput);
        }
        Err(e) => return Err(e.into()),
    };

    let written = match &outcome {
        MergeOutcome::Merged(merged) if !config.check_only => {
            Some(write_output(&config, &merged.table)?)
        }
        _ => None,
    };

    // Render report; it moves to stderr when stdout carries the CSV
    let summaries = uploads.summaries();
    let report = Report {
        files: &summaries,
        outcome: &outcome,
        preview_rows: config.preview_rows,
        written: written.as_ref(),
    };
    let to_stderr = config.writes_to_stdout();
    let is_tty = if to_stderr {
        io::stderr().is_terminal()
    } else {
        io::stdout().is_terminal()
    };
    let color = if is_tty && config.output_format == OutputFormat::Terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stream = if to_stderr {
        StandardStream::stderr(color)
    } else {
        StandardStream::stdout(color)
    };
    OutputFactory::create(config.output_format).render(&report, &mut stream)?;

    Ok(match outcome {
        MergeOutcome::Merged(_) => Status::Merged,
        MergeOutcome::Mismatch(_) => Status::Mismatch,
    })
}

fn write_output(config: &Config, table: &csvmerge::Table) -> Result<WrittenOutput> {
    let bytes = serialize(table)?;

    if config.writes_to_stdout() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
    } else {
        fs::write(&config.output, &bytes)
            .with_context(|| format!("Failed to write output file: {}", config.output.display()))?;
    }
    info!(path = %config.output.display(), bytes = bytes.len(), "wrote merged CSV");

    Ok(WrittenOutput {
        path: config.output.clone(),
        bytes: bytes.len(),
    })
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// The name an upload is reported under
fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => {
                    Ok(c as u8)
                }
                _ => Err(format!(
                    "delimiter must be a single ASCII character or \"tab\", got {:?}",
                    s
                )),
            }
        }
    }
}

fn print_instructions() {
    eprintln!("Please supply CSV files to get started.");
    eprintln!();
    eprintln!("How to use:");
    eprintln!("  1. Pass two or more CSV files with the same column structure");
    eprintln!("  2. Review the preview of the merged data");
    eprintln!("  3. Find the merged rows in the output file (default {})", DEFAULT_OUTPUT_FILENAME);
    eprintln!();
    eprintln!("Notes:");
    eprintln!("  - All CSV files must have the same columns, in any order");
    eprintln!("  - The merged file contains all rows from all files, in the order given");
    eprintln!("  - Row indices are reset in the merged file");
}
