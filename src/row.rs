//! # Row
//!
//! The key/value structure rows take as they move from a source, through
//! shaping, to a destination. Column order is preserved, and a value can be
//! explicitly [`RowValue::Missing`] -- distinct from a present-but-null
//! value -- so consumers can tell "absent in the input" apart from "null in
//! the input".

use serde_json::Value;

/// A single column value.
///
/// Every producer and consumer in the pipeline agrees on this type: `Missing`
/// marks a column the input did not supply at all, while a null from the
/// input arrives as `Value(Value::Null)`.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    Missing,
    Value(Value),
}

impl RowValue {
    pub fn null() -> Self {
        Self::Value(Value::Null)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The underlying JSON value, if the column was present in the input.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Missing => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl From<Value> for RowValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for RowValue {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i32> for RowValue {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for RowValue {
    fn from(value: bool) -> Self {
        Self::Value(Value::from(value))
    }
}

/// An ordered mapping from column name to value.
///
/// Lookup is linear; rows are expected to stay at column counts where a map
/// would cost more than it saves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, RowValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value, replacing any existing value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<RowValue>) {
        let name = name.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    /// Builder-style insert, for `Row::new().with("day", "2015-04-01")`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RowValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Converts the row to a JSON object for destinations that want one.
    /// Missing columns are omitted; null columns serialize as JSON null.
    pub fn to_json_object(&self) -> serde_json::Map<String, Value> {
        self.columns
            .iter()
            .filter_map(|(n, v)| v.as_value().map(|v| (n.clone(), v.clone())))
            .collect()
    }
}

impl FromIterator<(String, RowValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, RowValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

impl From<serde_json::Map<String, Value>> for Row {
    fn from(object: serde_json::Map<String, Value>) -> Self {
        object
            .into_iter()
            .map(|(n, v)| (n, RowValue::Value(v)))
            .collect()
    }
}
