//! Row-at-a-time execution of a configured run.
//!
//! Inputs are drained strictly in order and each row is fully handled
//! before the next one is read. Text output filters and formats rows;
//! column file output re-encodes every row untouched.

use std::collections::BTreeSet;
use std::io::{BufWriter, Write};

use tracing::{debug, info};

use crate::columnfile::{ColumnFileWriter, RowSink};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::formatter::RowFormatter;
use crate::input::open_readers;
use crate::matcher::row_matches;
use crate::row::Row;

/// Rows forwarded between two flushes of the column file writer.
pub const FLUSH_INTERVAL: usize = 10_000;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub inputs: usize,
    pub rows_read: usize,
    pub rows_written: usize,
    pub flushes: usize,
}

/// Run `config` against its inputs, writing the result to `stdout`.
pub fn execute<W: Write>(config: &Config, stdout: W) -> Result<RunStats> {
    let stats = match config.output {
        OutputFormat::Text => {
            let projection = config.selected_fields();
            let mut out = BufWriter::new(stdout);
            let stats = write_text(config, open_readers(&config.inputs, &projection), &mut out)?;
            out.flush()?;
            stats
        }
        OutputFormat::ColumnFile => {
            let everything = BTreeSet::new();
            let mut writer = ColumnFileWriter::new(stdout);
            let stats = write_columnfile(open_readers(&config.inputs, &everything), &mut writer)?;
            writer.finish()?;
            stats
        }
    };

    info!(
        output = %config.output,
        inputs = stats.inputs,
        rows_read = stats.rows_read,
        rows_written = stats.rows_written,
        flushes = stats.flushes,
        "done"
    );
    Ok(stats)
}

/// Text pipeline: keep rows passing every filter and print them.
///
/// The first decode error stops the run; the failing row is not printed.
pub fn write_text<I, R, W>(config: &Config, sources: I, out: &mut W) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<R>>,
    R: Iterator<Item = Result<Row>>,
    W: Write,
{
    let mut formatter = RowFormatter::new(config.format.clone());
    let mut stats = RunStats::default();

    for source in sources {
        let rows = source?;
        stats.inputs += 1;

        for row in rows {
            let row = row?;
            stats.rows_read += 1;

            if !row_matches(&config.filters, &row) {
                continue;
            }

            out.write_all(formatter.format(&row)?)?;
            stats.rows_written += 1;
        }
    }

    Ok(stats)
}

/// Passthrough pipeline: forward every row to `sink`, flushing it after
/// each `FLUSH_INTERVAL` rows. Buffered rows left at the end are the
/// caller's to flush.
pub fn write_columnfile<I, R, S>(sources: I, sink: &mut S) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<R>>,
    R: Iterator<Item = Result<Row>>,
    S: RowSink,
{
    let mut stats = RunStats::default();
    let mut until_flush = FLUSH_INTERVAL;

    for source in sources {
        let rows = source?;
        stats.inputs += 1;

        for row in rows {
            let row = row?;
            stats.rows_read += 1;

            sink.put_row(&row)?;
            stats.rows_written += 1;

            until_flush -= 1;
            if until_flush == 0 {
                sink.flush()?;
                stats.flushes += 1;
                until_flush = FLUSH_INTERVAL;
                debug!(rows = stats.rows_written, "flushed");
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatError;
    use crate::filter::FilterEntry;
    use crate::input::InputSource;
    use crate::row::Field;

    /// Records what the pipeline hands to the writer.
    #[derive(Default)]
    struct RecordingSink {
        rows: Vec<Row>,
        flushed_at: Vec<usize>,
    }

    impl RowSink for RecordingSink {
        fn put_row(&mut self, row: &Row) -> Result<()> {
            self.rows.push(row.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushed_at.push(self.rows.len());
            Ok(())
        }
    }

    fn row(fields: &[(u32, &[u8])]) -> Row {
        Row::new(fields.iter().map(|&(c, v)| Field::new(c, v)).collect()).unwrap()
    }

    fn source(rows: Vec<Row>) -> Result<std::vec::IntoIter<Result<Row>>> {
        Ok(rows.into_iter().map(Ok).collect::<Vec<_>>().into_iter())
    }

    fn config(format: Option<&str>, filters: &[&str]) -> Config {
        let filters: Vec<FilterEntry> = filters.iter().map(|f| f.parse().unwrap()).collect();
        Config::new(format, filters, OutputFormat::Text, vec![InputSource::Stdin]).unwrap()
    }

    fn text(config: &Config, inputs: Vec<Vec<Row>>) -> Result<(String, RunStats)> {
        let mut out = Vec::new();
        let stats = write_text(config, inputs.into_iter().map(source), &mut out)?;
        Ok((String::from_utf8(out).unwrap(), stats))
    }

    #[test]
    fn test_text_without_filters_prints_every_row() {
        let cfg = config(None, &[]);
        let (output, stats) = text(
            &cfg,
            vec![vec![row(&[(0, b"a"), (1, b"b")]), row(&[(1, b"c")])]],
        )
        .unwrap();
        assert_eq!(output, "a\tb\n\tc\n");
        assert_eq!(stats.rows_read, 2);
        assert_eq!(stats.rows_written, 2);
    }

    #[test]
    fn test_text_filters_rows() {
        let cfg = config(Some("ss"), &["1:err"]);
        let (output, stats) = text(
            &cfg,
            vec![vec![
                row(&[(0, b"one"), (1, b"error: disk")]),
                row(&[(0, b"two"), (1, b"ok")]),
                row(&[(0, b"three")]),
                row(&[(0, b"four"), (1, b"stderr")]),
            ]],
        )
        .unwrap();
        assert_eq!(output, "one\terror: disk\nfour\tstderr\n");
        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.rows_written, 2);
    }

    #[test]
    fn test_text_concatenates_inputs_in_order() {
        let cfg = config(None, &[]);
        let (output, stats) = text(
            &cfg,
            vec![
                vec![row(&[(0, b"1")]), row(&[(0, b"2")])],
                vec![],
                vec![row(&[(0, b"3")])],
            ],
        )
        .unwrap();
        assert_eq!(output, "1\n2\n3\n");
        assert_eq!(stats.inputs, 3);
    }

    #[test]
    fn test_text_truncated_value_aborts_run() {
        let cfg = config(Some("I"), &[]);
        let mut out = Vec::new();
        let inputs = vec![
            vec![row(&[(0, &[1, 0, 0, 0])]), row(&[(0, &[2, 0])])],
            vec![row(&[(0, &[3, 0, 0, 0])])],
        ];
        let result = write_text(&cfg, inputs.into_iter().map(source), &mut out);
        assert!(matches!(result, Err(CatError::TruncatedValue { .. })));
        assert_eq!(out, b"1\n");
    }

    #[test]
    fn test_text_source_error_propagates() {
        let cfg = config(None, &[]);
        let mut out = Vec::new();
        let sources: Vec<Result<std::vec::IntoIter<Result<Row>>>> =
            vec![source(vec![row(&[(0, b"a")])]), Err(CatError::Corrupt("x".into()))];
        let result = write_text(&cfg, sources, &mut out);
        assert!(matches!(result, Err(CatError::Corrupt(_))));
        assert_eq!(out, b"a\n");
    }

    #[test]
    fn test_passthrough_forwards_rows_unchanged() {
        let first = vec![row(&[(0, b"a"), (5, b"\x00\x01")]), row(&[])];
        let second = vec![row(&[(2, b"z")])];
        let mut sink = RecordingSink::default();

        let stats = write_columnfile(
            vec![first.clone(), second.clone()].into_iter().map(source),
            &mut sink,
        )
        .unwrap();

        let expected: Vec<Row> = first.into_iter().chain(second).collect();
        assert_eq!(sink.rows, expected);
        assert!(sink.flushed_at.is_empty());
        assert_eq!(stats.rows_written, 3);
    }

    #[test]
    fn test_passthrough_flush_cadence() {
        let rows: Vec<Row> = (0..25_000u32)
            .map(|i| row(&[(0, &i.to_le_bytes())]))
            .collect();
        let mut sink = RecordingSink::default();

        let stats = write_columnfile([source(rows)], &mut sink).unwrap();

        assert_eq!(sink.flushed_at, vec![10_000, 20_000]);
        assert_eq!(stats.flushes, 2);
        assert_eq!(sink.rows.len(), 25_000);
    }

    #[test]
    fn test_passthrough_flush_counts_across_inputs() {
        let make = |n: u32| -> Vec<Row> { (0..n).map(|i| row(&[(0, &i.to_le_bytes())])).collect() };
        let mut sink = RecordingSink::default();

        write_columnfile(
            vec![make(6_000), make(6_000)].into_iter().map(source),
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.flushed_at, vec![10_000]);
    }

    #[test]
    fn test_passthrough_ignores_filters_and_format() {
        // Passthrough takes no Config at all; rows a filter would drop
        // still reach the sink.
        let rows = vec![row(&[(0, b"drop me")]), row(&[(3, b"short")])];
        let mut sink = RecordingSink::default();
        write_columnfile([source(rows.clone())], &mut sink).unwrap();
        assert_eq!(sink.rows, rows);
    }

    #[test]
    fn test_passthrough_round_trip_through_writer() {
        use crate::columnfile::ColumnFileReader;

        let rows = vec![row(&[(0, b"x"), (1, b"y")]), row(&[(4, b"")])];
        let mut writer = ColumnFileWriter::new(Vec::new());
        write_columnfile([source(rows.clone())], &mut writer).unwrap();
        let bytes = writer.finish().unwrap();

        let back: Vec<Row> = ColumnFileReader::new(&bytes[..])
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(back, rows);
    }
}
