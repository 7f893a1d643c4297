//! Text rendering of a single row.

use crate::error::Result;
use crate::format::{ColumnRule, FormatSpec};
use crate::row::Row;

/// Renders rows as tab-separated lines.
///
/// Columns keep their position on the line: a column the format shows but
/// the row lacks still produces its separator, while a `_` column produces
/// none. With a format, fields past its last character are not printed.
#[derive(Debug, Clone, Default)]
pub struct RowFormatter {
    spec: Option<FormatSpec>,
    line: Vec<u8>,
}

impl RowFormatter {
    pub fn new(spec: Option<FormatSpec>) -> Self {
        Self {
            spec,
            line: Vec::new(),
        }
    }

    fn rule_for(&self, column: u64) -> Option<ColumnRule> {
        match &self.spec {
            Some(spec) => u32::try_from(column).ok().and_then(|c| spec.rule(c)),
            None => Some(ColumnRule::Text),
        }
    }

    /// Render `row` into the internal buffer and return the finished line,
    /// newline included. On error nothing usable is returned.
    pub fn format(&mut self, row: &Row) -> Result<&[u8]> {
        self.line.clear();
        let mut next_column: u64 = 0;
        let mut need_tab = false;

        for field in row.fields() {
            let column = u64::from(field.column);
            let Some(rule) = self.rule_for(column) else {
                break;
            };

            while next_column < column {
                let gap = self.rule_for(next_column).unwrap_or(ColumnRule::Text);
                if !gap.is_omitted() {
                    self.line.push(b'\t');
                }
                next_column += 1;
            }
            next_column = column + 1;

            if rule.is_omitted() {
                continue;
            }

            if need_tab {
                self.line.push(b'\t');
            }
            rule.render(field.column, &field.value, &mut self.line)?;
            need_tab = true;
        }

        self.line.push(b'\n');
        Ok(&self.line)
    }
}
