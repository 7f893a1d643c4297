//! Error type shared by every stage of the tool.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a run. All variants are fatal.
#[derive(Error, Debug)]
pub enum CatError {
    #[error("malformed filter '{arg}': {reason}")]
    MalformedFilter { arg: String, reason: String },

    #[error("invalid format character '{found}' at position {position}")]
    InvalidFormat { position: usize, found: char },

    #[error("column {column}: '{rule}' needs {needed} bytes, value has {actual}")]
    TruncatedValue {
        column: u32,
        rule: char,
        needed: usize,
        actual: usize,
    },

    #[error("unsupported output format '{0}' (expected text or columnfile)")]
    UnsupportedOutputFormat(String),

    #[error("row fields must be strictly increasing by column ({previous} then {next})")]
    UnsortedRow { previous: u32, next: u32 },

    #[error("corrupt column file: {0}")]
    Corrupt(String),

    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, CatError>;

impl CatError {
    /// True when the error is a closed stdout (e.g. piping into `head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, CatError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
