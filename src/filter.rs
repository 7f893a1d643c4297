//! `--filter=COL:PATTERN` parsing and the sorted filter table.

use std::str::FromStr;

use memchr::memmem::Finder;

use crate::error::{CatError, Result};

/// A row passes this entry when the field at `column` contains `pattern`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub column: u32,
    pub pattern: Vec<u8>,
}

impl FilterEntry {
    pub fn new(column: u32, pattern: impl Into<Vec<u8>>) -> Self {
        Self {
            column,
            pattern: pattern.into(),
        }
    }

    /// Parse a raw `COL:PATTERN` argument. Only the first `:` delimits;
    /// anything after it, colons included, is the pattern. The pattern is
    /// taken as raw bytes and need not be UTF-8.
    pub fn parse_bytes(arg: &[u8]) -> Result<Self> {
        let malformed = |reason: String| CatError::MalformedFilter {
            arg: String::from_utf8_lossy(arg).into_owned(),
            reason,
        };

        let delimiter = arg
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| malformed("expected COL:PATTERN".to_string()))?;
        let (column, pattern) = (&arg[..delimiter], &arg[delimiter + 1..]);

        let column = std::str::from_utf8(column)
            .ok()
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(|| {
                malformed(format!(
                    "invalid column '{}'",
                    String::from_utf8_lossy(column)
                ))
            })?;

        Ok(FilterEntry::new(column, pattern))
    }
}

impl FromStr for FilterEntry {
    type Err = CatError;

    fn from_str(arg: &str) -> Result<Self> {
        FilterEntry::parse_bytes(arg.as_bytes())
    }
}

/// All filters, sorted by column. Entries sharing a column keep their
/// command-line order and must all match.
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    entries: Vec<FilterEntry>,
    // finders[i] searches for entries[i].pattern
    finders: Vec<Finder<'static>>,
}

impl PartialEq for FilterTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FilterTable {}

impl FilterTable {
    pub fn new(mut entries: Vec<FilterEntry>) -> Self {
        // sort_by_key is stable
        entries.sort_by_key(|e| e.column);
        let finders = entries
            .iter()
            .map(|e| Finder::new(&e.pattern).into_owned())
            .collect();
        Self { entries, finders }
    }

    /// Parse every raw `COL:PATTERN` argument.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let entries = args
            .iter()
            .map(|a| a.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// True when `value` contains the pattern of entry `index`.
    pub fn entry_matches(&self, index: usize, value: &[u8]) -> bool {
        self.finders[index].find(value).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Columns that must be decoded for the filters to be evaluated.
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().map(|e| e.column)
    }
}
