//! Input sources: named files or standard input, opened on demand.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::columnfile::ColumnFileReader;
use crate::error::{CatError, Result};

/// Where one input's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Map positional arguments to sources. `-` is stdin, and no arguments
    /// at all means a single stdin.
    pub fn from_args<P: AsRef<Path>>(args: &[P]) -> Vec<InputSource> {
        if args.is_empty() {
            return vec![InputSource::Stdin];
        }
        args.iter()
            .map(|a| {
                let path = a.as_ref();
                if path.as_os_str() == "-" {
                    InputSource::Stdin
                } else {
                    InputSource::File(path.to_path_buf())
                }
            })
            .collect()
    }

    pub fn open(&self) -> Result<Box<dyn Read>> {
        match self {
            InputSource::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            InputSource::File(path) => {
                let file = File::open(path).map_err(|source| CatError::Open {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "-".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// One reader per source, each opened only when the previous one has been
/// consumed. A non-empty `projection` is applied to every reader.
pub fn open_readers<'a>(
    sources: &'a [InputSource],
    projection: &'a BTreeSet<u32>,
) -> impl Iterator<Item = Result<ColumnFileReader<Box<dyn Read>>>> + 'a {
    sources.iter().map(move |source| {
        debug!(input = %source.name(), "opening input");
        let mut reader = ColumnFileReader::new(source.open()?);
        if !projection.is_empty() {
            reader.set_column_filter(projection.iter().copied());
        }
        Ok(reader)
    })
}
