//! Per-column format strings (`--format`).
//!
//! Character `i` of the format string is the rule for column `i`. The
//! binary rules follow Python's `struct` format characters:
//!
//! | char | type | width |
//! |------|------|-------|
//! | `H`  | u16  | 2     |
//! | `I`  | u32  | 4     |
//! | `Q`  | u64  | 8     |
//! | `h`  | i16  | 2     |
//! | `i`  | i32  | 4     |
//! | `q`  | i64  | 8     |
//! | `f`  | f32  | 4     |
//! | `d`  | f64  | 8     |
//!
//! `s` copies the value verbatim and `_` drops the column from the output.
//! Binary values are little-endian.

use crate::error::{CatError, Result};

/// How a single column is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRule {
    Omit,
    Text,
    U16,
    U32,
    U64,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl ColumnRule {
    pub fn from_char(ch: char) -> Option<Self> {
        let rule = match ch {
            '_' => ColumnRule::Omit,
            's' => ColumnRule::Text,
            'H' => ColumnRule::U16,
            'I' => ColumnRule::U32,
            'Q' => ColumnRule::U64,
            'h' => ColumnRule::I16,
            'i' => ColumnRule::I32,
            'q' => ColumnRule::I64,
            'f' => ColumnRule::F32,
            'd' => ColumnRule::F64,
            _ => return None,
        };
        Some(rule)
    }

    pub fn as_char(self) -> char {
        match self {
            ColumnRule::Omit => '_',
            ColumnRule::Text => 's',
            ColumnRule::U16 => 'H',
            ColumnRule::U32 => 'I',
            ColumnRule::U64 => 'Q',
            ColumnRule::I16 => 'h',
            ColumnRule::I32 => 'i',
            ColumnRule::I64 => 'q',
            ColumnRule::F32 => 'f',
            ColumnRule::F64 => 'd',
        }
    }

    /// Bytes a value needs under this rule; zero for `s` and `_`.
    pub fn width(self) -> usize {
        match self {
            ColumnRule::Omit | ColumnRule::Text => 0,
            ColumnRule::U16 | ColumnRule::I16 => 2,
            ColumnRule::U32 | ColumnRule::I32 | ColumnRule::F32 => 4,
            ColumnRule::U64 | ColumnRule::I64 | ColumnRule::F64 => 8,
        }
    }

    pub fn is_omitted(self) -> bool {
        self == ColumnRule::Omit
    }

    /// Append the rendering of `value` to `out`.
    ///
    /// Only the first `width()` bytes of a binary value are read; a shorter
    /// value is a `TruncatedValue` error and nothing is appended.
    pub fn render(self, column: u32, value: &[u8], out: &mut Vec<u8>) -> Result<()> {
        match self {
            ColumnRule::Omit => {}
            ColumnRule::Text => out.extend_from_slice(value),
            ColumnRule::U16 => push(out, u16::from_le_bytes(self.take(column, value)?)),
            ColumnRule::U32 => push(out, u32::from_le_bytes(self.take(column, value)?)),
            ColumnRule::U64 => push(out, u64::from_le_bytes(self.take(column, value)?)),
            ColumnRule::I16 => push(out, i16::from_le_bytes(self.take(column, value)?)),
            ColumnRule::I32 => push(out, i32::from_le_bytes(self.take(column, value)?)),
            ColumnRule::I64 => push(out, i64::from_le_bytes(self.take(column, value)?)),
            ColumnRule::F32 => {
                let v = f32::from_le_bytes(self.take(column, value)?);
                push(out, format_general(f64::from(v)))
            }
            ColumnRule::F64 => {
                let v = f64::from_le_bytes(self.take(column, value)?);
                push(out, format_general(v))
            }
        }
        Ok(())
    }

    fn take<const N: usize>(self, column: u32, value: &[u8]) -> Result<[u8; N]> {
        value
            .get(..N)
            .and_then(|b| b.try_into().ok())
            .ok_or(CatError::TruncatedValue {
                column,
                rule: self.as_char(),
                needed: N,
                actual: value.len(),
            })
    }
}

fn push(out: &mut Vec<u8>, v: impl ToString) {
    out.extend_from_slice(v.to_string().as_bytes());
}

/// Render a float the way C's `%g` does at the default precision of 6.
pub fn format_general(v: f64) -> String {
    const PRECISION: i32 = 6;

    if v.is_nan() {
        return if v.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent after rounding to PRECISION significant digits decides
    // between fixed and scientific notation.
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let fixed = format!("{:.*}", (PRECISION - 1 - exp) as usize, v);
        trim_fraction(&fixed).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// A parsed `--format` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    rules: Vec<ColumnRule>,
}

impl FormatSpec {
    /// Parse a format string. Unknown characters are rejected.
    pub fn parse(spec: &str) -> Result<Self> {
        let rules = spec
            .chars()
            .enumerate()
            .map(|(position, found)| {
                ColumnRule::from_char(found).ok_or(CatError::InvalidFormat { position, found })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Rule for `column`, or `None` past the end of the spec.
    pub fn rule(&self, column: u32) -> Option<ColumnRule> {
        self.rules.get(column as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Columns the output needs: every position not marked `_`.
    pub fn visible_columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_omitted())
            .map(|(i, _)| i as u32)
    }
}
