//! # columnfile-cat
//!
//! Print, filter and re-encode the rows of column files.
//!
//! A column file stores records as sparse rows of `(column, bytes)` fields.
//! This crate reads them back one row at a time and either prints them as
//! tab-separated text or writes them out again as a column file.
//!
//! ## Overview
//!
//! - **Filters** (`COL:PATTERN`): a row is kept only if every filtered
//!   column is present and contains its pattern
//! - **Formats**: one character per column says how to print it; `s` for
//!   text, `_` to hide the column, and `H I Q h i q f d` for little-endian
//!   binary numbers
//! - **Alignment**: missing columns still get their tab separator, so the
//!   output always lines up with the format
//! - **Passthrough**: `columnfile` output copies rows unchanged
//!
//! ## Example
//!
//! ```
//! use columnfile_cat::{Field, FilterTable, FormatSpec, Row, RowFormatter, row_matches};
//!
//! // Column 0: request line, column 1: client, column 2: status as u32
//! let row = Row::new(vec![
//!     Field::new(0, "GET /index.html"),
//!     Field::new(1, "10.0.0.7"),
//!     Field::new(2, 200u32.to_le_bytes()),
//! ])
//! .unwrap();
//!
//! let filters = FilterTable::parse(&["0:GET"]).unwrap();
//! assert!(row_matches(&filters, &row));
//!
//! let mut formatter = RowFormatter::new(Some(FormatSpec::parse("s_I").unwrap()));
//! assert_eq!(formatter.format(&row).unwrap(), b"GET /index.html\t200\n");
//! ```

pub mod columnfile;
pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod format;
pub mod formatter;
pub mod input;
pub mod matcher;
pub mod row;

pub use columnfile::{ColumnFileReader, ColumnFileWriter, RowSink};
pub use config::{Config, OutputFormat};
pub use error::{CatError, Result};
pub use executor::{FLUSH_INTERVAL, RunStats, execute, write_columnfile, write_text};
pub use filter::{FilterEntry, FilterTable};
pub use format::{ColumnRule, FormatSpec};
pub use formatter::RowFormatter;
pub use input::{InputSource, open_readers};
pub use matcher::row_matches;
pub use row::{Field, Row};
