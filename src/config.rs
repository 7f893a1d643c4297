//! Run configuration, built once from the command line.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CatError, Result};
use crate::filter::{FilterEntry, FilterTable};
use crate::format::FormatSpec;
use crate::input::InputSource;

/// What the tool writes to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tab-separated lines, filtered and formatted.
    #[default]
    Text,
    /// Every input row re-encoded as a column file.
    ColumnFile,
}

impl FromStr for OutputFormat {
    type Err = CatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "text" => Ok(OutputFormat::Text),
            "columnfile" => Ok(OutputFormat::ColumnFile),
            other => Err(CatError::UnsupportedOutputFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::ColumnFile => write!(f, "columnfile"),
        }
    }
}

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub format: Option<FormatSpec>,
    pub filters: FilterTable,
    pub output: OutputFormat,
    pub inputs: Vec<InputSource>,
}

impl Config {
    /// An empty `format` string is treated as no format at all.
    pub fn new(
        format: Option<&str>,
        filters: Vec<FilterEntry>,
        output: OutputFormat,
        inputs: Vec<InputSource>,
    ) -> Result<Self> {
        let format = match format {
            Some(spec) if !spec.is_empty() => Some(FormatSpec::parse(spec)?),
            _ => None,
        };
        Ok(Self {
            format,
            filters: FilterTable::new(filters),
            output,
            inputs,
        })
    }

    /// Columns the reader has to decode: every visible format column plus
    /// every filtered column. Empty means no projection.
    pub fn selected_fields(&self) -> BTreeSet<u32> {
        let mut selected: BTreeSet<u32> = self
            .format
            .iter()
            .flat_map(|spec| spec.visible_columns())
            .collect();
        selected.extend(self.filters.columns());
        selected
    }
}
