use std::collections::BTreeSet;
use std::io::Write;

use tracing::trace;

use super::{ABSENT, MAGIC, RowSink, VERSION};
use crate::error::{CatError, Result};
use crate::row::Row;

/// Buffers rows and writes them as one block per `flush`.
pub struct ColumnFileWriter<W: Write> {
    inner: W,
    pending: Vec<Row>,
    header_written: bool,
}

impl<W: Write> ColumnFileWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            header_written: false,
        }
    }

    /// Rows buffered since the last flush.
    pub fn pending_rows(&self) -> usize {
        self.pending.len()
    }

    /// Flush remaining rows and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.write_header()?;
        RowSink::flush(&mut self)?;
        Ok(self.inner)
    }

    fn write_header(&mut self) -> Result<()> {
        if !self.header_written {
            self.inner.write_all(MAGIC)?;
            self.inner.write_all(&[VERSION])?;
            self.header_written = true;
        }
        Ok(())
    }

    fn write_block(&mut self) -> Result<()> {
        let row_count = len_u32(self.pending.len(), "row count")?;
        let columns: BTreeSet<u32> = self
            .pending
            .iter()
            .flat_map(|r| r.fields().iter().map(|f| f.column))
            .collect();

        let mut block = Vec::new();
        block.extend_from_slice(&row_count.to_le_bytes());
        block.extend_from_slice(&len_u32(columns.len(), "column count")?.to_le_bytes());

        // Per-row cursor into the fields; columns are visited ascending, so
        // each row's cursor only ever moves forward.
        let mut cursors = vec![0usize; self.pending.len()];
        let mut payload = Vec::new();
        for column in columns {
            payload.clear();
            for (row, cursor) in self.pending.iter().zip(cursors.iter_mut()) {
                match row.fields().get(*cursor) {
                    Some(field) if field.column == column => {
                        let len = len_u32(field.value.len(), "value length")?;
                        if len == ABSENT {
                            return Err(CatError::Corrupt(format!(
                                "value in column {column} is too large"
                            )));
                        }
                        payload.extend_from_slice(&len.to_le_bytes());
                        payload.extend_from_slice(&field.value);
                        *cursor += 1;
                    }
                    _ => payload.extend_from_slice(&ABSENT.to_le_bytes()),
                }
            }
            block.extend_from_slice(&column.to_le_bytes());
            block.extend_from_slice(&len_u32(payload.len(), "chunk length")?.to_le_bytes());
            block.extend_from_slice(&payload);
        }

        self.inner.write_all(&block)?;
        trace!(rows = self.pending.len(), bytes = block.len(), "wrote block");
        self.pending.clear();
        Ok(())
    }
}

impl<W: Write> RowSink for ColumnFileWriter<W> {
    fn put_row(&mut self, row: &Row) -> Result<()> {
        self.pending.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            self.write_header()?;
            self.write_block()?;
        }
        self.inner.flush()?;
        Ok(())
    }
}

fn len_u32(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| CatError::Corrupt(format!("{what} {len} does not fit in u32")))
}
