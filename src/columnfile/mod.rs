//! A small block-based column file container.
//!
//! ```text
//! file    := "COLF" version:u8 block*
//! block   := row_count:u32 column_count:u32 chunk*
//! chunk   := column:u32 byte_len:u32 payload
//! payload := row_count x (len:u32 bytes)   len == u32::MAX marks an absent cell
//! ```
//!
//! All integers are little-endian. Chunks inside a block are strictly
//! ascending by column, which is what lets the reader hand out sorted rows
//! and skip unselected columns without decoding them.

mod reader;
mod writer;

pub use reader::ColumnFileReader;
pub use writer::ColumnFileWriter;

use crate::error::Result;
use crate::row::Row;

pub(crate) const MAGIC: &[u8; 4] = b"COLF";
pub(crate) const VERSION: u8 = 1;
pub(crate) const ABSENT: u32 = u32::MAX;

/// Destination for rows in passthrough mode.
pub trait RowSink {
    /// Buffer one row.
    fn put_row(&mut self, row: &Row) -> Result<()>;

    /// Write out everything buffered so far.
    fn flush(&mut self) -> Result<()>;
}
