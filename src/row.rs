//! Rows and fields as produced by the column file reader.

use crate::error::{CatError, Result};

/// One `(column index, raw value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub column: u32,
    pub value: Vec<u8>,
}

impl Field {
    pub fn new(column: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// A record: fields strictly increasing by column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<Field>,
}

impl Row {
    /// Build a row, rejecting duplicate or out-of-order columns.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        for pair in fields.windows(2) {
            if pair[0].column >= pair[1].column {
                return Err(CatError::UnsortedRow {
                    previous: pair[0].column,
                    next: pair[1].column,
                });
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, column: u32) -> Option<&Field> {
        self.fields
            .binary_search_by_key(&column, |f| f.column)
            .ok()
            .map(|i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
