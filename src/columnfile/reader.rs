use std::collections::{BTreeSet, VecDeque};
use std::io::{self, Read};

use tracing::trace;

use super::{ABSENT, MAGIC, VERSION};
use crate::error::{CatError, Result};
use crate::row::{Field, Row};

/// Forward-only row reader over a column file.
///
/// Blocks are decoded one at a time. With a column filter set, chunks for
/// other columns are skipped unread.
pub struct ColumnFileReader<R: Read> {
    inner: R,
    projection: Option<BTreeSet<u32>>,
    started: bool,
    done: bool,
    rows: VecDeque<Row>,
    // Rows of a block with no decoded columns, handed out without storage.
    empty_rows: usize,
}

impl<R: Read> ColumnFileReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            projection: None,
            started: false,
            done: false,
            rows: VecDeque::new(),
            empty_rows: 0,
        }
    }

    /// Only decode these columns; all others are absent from returned rows.
    pub fn set_column_filter<I: IntoIterator<Item = u32>>(&mut self, columns: I) {
        self.projection = Some(columns.into_iter().collect());
    }

    /// True once every row has been returned.
    pub fn end(&mut self) -> Result<bool> {
        while self.rows.is_empty() && self.empty_rows == 0 && !self.done {
            self.load_block()?;
        }
        Ok(self.rows.is_empty() && self.empty_rows == 0)
    }

    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if self.end()? {
            return Ok(None);
        }
        if let Some(row) = self.rows.pop_front() {
            return Ok(Some(row));
        }
        self.empty_rows -= 1;
        Ok(Some(Row::default()))
    }

    fn load_block(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            let mut header = [0u8; 5];
            if !self.read_or_eof(&mut header)? {
                self.done = true;
                return Ok(());
            }
            if &header[..4] != MAGIC {
                return Err(CatError::Corrupt("bad magic".to_string()));
            }
            if header[4] != VERSION {
                return Err(CatError::Corrupt(format!(
                    "unsupported version {}",
                    header[4]
                )));
            }
        }

        let mut counts = [0u8; 8];
        if !self.read_or_eof(&mut counts)? {
            self.done = true;
            return Ok(());
        }
        let row_count = u32_at(&counts, 0) as usize;
        let column_count = u32_at(&counts, 4);

        // Allocated once a chunk payload has been read, so its size is
        // bounded by the input rather than by the header.
        let mut fields: Option<Vec<Vec<Field>>> = None;
        let mut previous: Option<u32> = None;
        let mut payload = Vec::new();

        for _ in 0..column_count {
            let mut chunk_header = [0u8; 8];
            self.read_full(&mut chunk_header)?;
            let column = u32_at(&chunk_header, 0);
            let byte_len = u64::from(u32_at(&chunk_header, 4));

            if previous.is_some_and(|p| p >= column) {
                return Err(CatError::Corrupt(format!(
                    "column {column} out of order in block"
                )));
            }
            previous = Some(column);

            if byte_len < 4 * row_count as u64 {
                return Err(chunk_error(
                    column,
                    "chunk shorter than its block's row count",
                ));
            }

            if self.projection.as_ref().is_some_and(|p| !p.contains(&column)) {
                let skipped = io::copy(&mut (&mut self.inner).take(byte_len), &mut io::sink())?;
                if skipped != byte_len {
                    return Err(truncated());
                }
                continue;
            }

            payload.clear();
            let read = (&mut self.inner).take(byte_len).read_to_end(&mut payload)?;
            if read as u64 != byte_len {
                return Err(truncated());
            }
            let rows =
                fields.get_or_insert_with(|| (0..row_count).map(|_| Vec::new()).collect());
            decode_chunk(column, &payload, rows)?;
        }

        trace!(rows = row_count, columns = column_count, "read block");
        match fields {
            Some(rows) => {
                for row in rows {
                    self.rows.push_back(Row::new(row)?);
                }
            }
            None => self.empty_rows = row_count,
        }
        Ok(())
    }

    /// Fill `buf`, or return `false` on a clean end of stream before any byte.
    fn read_or_eof(&mut self, buf: &mut [u8]) -> Result<bool> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(false),
            n if n == buf.len() => Ok(true),
            _ => Err(truncated()),
        }
    }

    fn read_full(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                truncated()
            } else {
                e.into()
            }
        })
    }
}

impl<R: Read> Iterator for ColumnFileReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_row() {
            Ok(row) => row.map(Ok),
            Err(e) => {
                self.done = true;
                self.rows.clear();
                self.empty_rows = 0;
                Some(Err(e))
            }
        }
    }
}

fn decode_chunk(column: u32, payload: &[u8], rows: &mut [Vec<Field>]) -> Result<()> {
    let mut pos = 0;
    for row in rows.iter_mut() {
        let len = payload
            .get(pos..pos + 4)
            .map(|b| u32_at(b, 0))
            .ok_or_else(|| chunk_error(column, "cell header past end of chunk"))?;
        pos += 4;
        if len == ABSENT {
            continue;
        }
        let end = pos + len as usize;
        let value = payload
            .get(pos..end)
            .ok_or_else(|| chunk_error(column, "cell value past end of chunk"))?;
        row.push(Field::new(column, value));
        pos = end;
    }
    if pos != payload.len() {
        return Err(chunk_error(column, "trailing bytes after last cell"));
    }
    Ok(())
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

fn truncated() -> CatError {
    CatError::Corrupt("unexpected end of file".to_string())
}

fn chunk_error(column: u32, what: &str) -> CatError {
    CatError::Corrupt(format!("column {column}: {what}"))
}
