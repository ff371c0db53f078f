//! Literal values appearing on the right-hand side of comparisons

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;

/// A decoded literal; equality compares values, not source spelling
#[derive(Debug, Clone, PartialEq)]
pub enum StixValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Hex(Vec<u8>),
    Binary(Vec<u8>),
}

/// Write `s` as a single-quoted literal, escaping `\` and `'`
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\'' => f.write_str("\\'")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for StixValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StixValue::String(s) => write_quoted(f, s),
            StixValue::Int(i) => write!(f, "{}", i),
            // Debug always keeps a '.' or an exponent, so the text lexes back as a float
            StixValue::Float(x) => write!(f, "{:?}", x),
            StixValue::Bool(b) => write!(f, "{}", b),
            StixValue::Timestamp(ts) => {
                write!(f, "t'{}'", ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            StixValue::Hex(bytes) => {
                f.write_str("h'")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                f.write_str("'")
            }
            StixValue::Binary(bytes) => write!(f, "b'{}'", STANDARD.encode(bytes)),
        }
    }
}

/// Right-hand side of a binary comparison
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonRhs {
    Value(StixValue),
    Set(Vec<StixValue>),
}

impl From<StixValue> for ComparisonRhs {
    fn from(value: StixValue) -> Self {
        ComparisonRhs::Value(value)
    }
}

impl From<Vec<StixValue>> for ComparisonRhs {
    fn from(values: Vec<StixValue>) -> Self {
        ComparisonRhs::Set(values)
    }
}

impl fmt::Display for ComparisonRhs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonRhs::Value(v) => write!(f, "{}", v),
            ComparisonRhs::Set(values) => write!(f, "({})", values.iter().join(", ")),
        }
    }
}
