//! CLI tool to print or re-encode column files.
//!
//! Usage:
//!   columnfile-cat [OPTION]... [FILE]...
//!
//! With no FILE, or when FILE is -, reads standard input.

use clap::Parser;
use clap::builder::TypedValueParser;
use clap::error::ErrorKind;
use columnfile_cat::{Config, FilterEntry, InputSource, OutputFormat, execute};
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing::Level;

/// Parses `--filter` from the raw argument bytes, so patterns need not be UTF-8.
#[derive(Clone)]
struct FilterEntryParser;

impl TypedValueParser for FilterEntryParser {
    type Value = FilterEntry;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        FilterEntry::parse_bytes(value.as_encoded_bytes()).map_err(|e| {
            clap::Error::raw(
                ErrorKind::ValueValidation,
                format!("invalid value for '--filter': {e}\n"),
            )
            .with_cmd(cmd)
        })
    }
}

/// Print the rows of column files as tab-separated text.
#[derive(Parser)]
#[command(
    name = "columnfile-cat",
    version,
    after_help = "With no FILE, or when FILE is -, read standard input."
)]
struct Cli {
    /// Column formats, one character per column: s text, _ hidden,
    /// H I Q unsigned, h i q signed, f d float
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Only show rows whose column COL contains PATTERN (repeatable)
    #[arg(long = "filter", value_name = "COL:PATTERN", value_parser = FilterEntryParser)]
    filters: Vec<FilterEntry>,

    /// Output format: text or columnfile
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    output_format: OutputFormat,

    /// Log inputs, flushes and row counts on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Input column files
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let config = match Config::new(
        cli.format.as_deref(),
        cli.filters,
        cli.output_format,
        InputSource::from_args(&cli.files),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("columnfile-cat: {e}");
            process::exit(2);
        }
    };

    match execute(&config, io::stdout().lock()) {
        Ok(_) => {}
        Err(e) if e.is_broken_pipe() => {}
        Err(e) => {
            eprintln!("columnfile-cat: {e}");
            process::exit(1);
        }
    }
}
