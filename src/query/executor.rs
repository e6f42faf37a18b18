//! Store seam - the single generic executor every report goes through
//!
//! `RelationalStore` is implemented by `SqliteStore`; tests substitute their
//! own stores to observe or fail the reads.

use crate::query::spec::QuerySpec;
use crate::{Error, Result};
use chrono::NaiveDate;

/// Executes a `QuerySpec` and returns every result row.
///
/// One call is one read: implementations must run the whole spec (including
/// any scalar subquery) as a single statement so it observes one snapshot.
pub trait RelationalStore {
    fn select(&self, query: &QuerySpec) -> Result<Vec<Record>>;
}

/// A single cell as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        }
    }
}

impl From<rusqlite::types::ValueRef<'_>> for Value {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

/// One result row, in projection order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Result<&Value> {
        self.values
            .get(idx)
            .ok_or_else(|| Error::Decode(format!("column {} out of range ({} columns)", idx, self.len())))
    }

    pub fn text(&self, idx: usize) -> Result<String> {
        match self.get(idx)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(idx, "text", other)),
        }
    }

    pub fn integer(&self, idx: usize) -> Result<i64> {
        self.opt_integer(idx)?
            .ok_or_else(|| Error::Decode(format!("column {}: expected integer, found null", idx)))
    }

    pub fn opt_integer(&self, idx: usize) -> Result<Option<i64>> {
        match self.get(idx)? {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(*i)),
            other => Err(mismatch(idx, "integer", other)),
        }
    }

    pub fn date(&self, idx: usize) -> Result<NaiveDate> {
        self.opt_date(idx)?
            .ok_or_else(|| Error::Decode(format!("column {}: expected date, found null", idx)))
    }

    /// Dates are stored as ISO-8601 `YYYY-MM-DD` text
    pub fn opt_date(&self, idx: usize) -> Result<Option<NaiveDate>> {
        match self.get(idx)? {
            Value::Null => Ok(None),
            Value::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Some)
                .map_err(|e| Error::Decode(format!("column {}: bad date {:?}: {}", idx, s, e))),
            other => Err(mismatch(idx, "date", other)),
        }
    }
}

fn mismatch(idx: usize, expected: &str, found: &Value) -> Error {
    Error::Decode(format!(
        "column {}: expected {}, found {}",
        idx,
        expected,
        found.type_name()
    ))
}
