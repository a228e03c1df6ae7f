// Data module for the scalar value and row model
// Author: Gabriel Demetrios Lafis

mod csv;
mod json;

pub use csv::*;
pub use json::*;

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// A scalar cell value in a row.
///
/// The engine is schema-free: a row may hold any mix of value types, and
/// the same field may hold different types in different rows. Missing
/// data is represented by `Null` (or a NaN float produced by a failed
/// numeric cast); the number zero and the empty string are real values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Whether this value counts as missing for statistics and filters.
    /// Null and NaN are missing; `0`, `false` and `""` are present.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value. Booleans and strings are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// The name of the value's type, as reported by `Table::describe`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
        }
    }

    /// Total ordering across value types, used by sort, min/max,
    /// percentile and mode. Missing values order first, then booleans
    /// (false before true), then numbers (integers and floats compared
    /// as f64), then strings (lexical).
    pub fn compare(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            if v.is_missing() {
                return 0;
            }
            match v {
                Value::Boolean(_) => 1,
                Value::Integer(_) | Value::Float(_) => 2,
                Value::String(_) => 3,
                Value::Null => 0,
            }
        }

        let (ra, rb) = (rank(self), rank(other));
        if ra != rb {
            return ra.cmp(&rb);
        }

        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        }
    }

    /// Type-prefixed canonical form, used to build structural group keys
    /// and to key frequency counts. The prefix keeps `Integer(5)` and
    /// `String("5")` distinct.
    pub fn canonical_key(&self) -> String {
        match self {
            Value::Null => "n:".to_string(),
            Value::Boolean(b) => format!("b:{}", b),
            Value::Integer(i) => format!("i:{}", i),
            Value::Float(f) => {
                // An integral float keys the same as the integer so
                // grouping on cast data stays stable.
                if f.is_nan() {
                    "n:".to_string()
                } else if f.fract() == 0.0 && f.is_finite() {
                    format!("i:{}", *f as i64)
                } else {
                    format!("f:{}", f)
                }
            },
            Value::String(s) => format!("s:{}", s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

/// A single record: an insertion-ordered mapping from field name to
/// value. Lookup is linear, which is the right trade at notebook scale
/// and keeps first-row field order meaningful for `Table::model`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Row { fields: Vec::new() }
    }

    /// Create an empty row with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Row {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing an existing value in place or appending a
    /// new field at the end.
    pub fn set<S: Into<String>>(&mut self, name: S, value: Value) {
        let name = name.into();
        for (n, v) in &mut self.fields {
            if *n == name {
                *v = value;
                return;
            }
        }
        self.fields.push((name, value));
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Whether the row carries a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Remove a field by name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields in the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append every field of `other`, overwriting same-named fields.
    pub fn extend_from(&mut self, other: &Row) {
        for (n, v) in other.iter() {
            self.set(n, v.clone());
        }
    }

    /// Canonical structural key: fields sorted by name, each rendered in
    /// type-prefixed canonical form. Two rows with the same fields in a
    /// different insertion order produce the same key.
    pub fn canonical_key(&self) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(n, v)| format!("{}\u{1}{}", n, v.canonical_key()))
            .collect();
        parts.sort();
        parts.join("\u{2}")
    }
}

impl From<Vec<(&str, Value)>> for Row {
    fn from(pairs: Vec<(&str, Value)>) -> Self {
        let mut row = Row::with_capacity(pairs.len());
        for (n, v) in pairs {
            row.set(n, v);
        }
        row
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (n, v) in iter {
            row.set(n, v);
        }
        row
    }
}

/// Errors raised at the data construction boundary. A malformed input
/// fails the whole construction; there is no partially-populated table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
