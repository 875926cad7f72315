//! # Schema
//!
//! The declared output shape of a job: an ordered mapping from column name
//! to a type descriptor. The core uses the schema purely as the
//! authoritative column set when shaping rows; type coercion and validation
//! belong to the destination collaborators that read the descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::row::{Row, RowValue};

/// Primitive column kinds understood by destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    String,
    Int,
    Float,
    Numeric,
    Bool,
    Date,
    Timestamp,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Numeric => write!(f, "numeric"),
            Self::Bool => write!(f, "bool"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
        }
    }
}

/// Column type descriptor: a primitive kind plus optional precision/scale
/// for numeric columns, e.g. `numeric(10, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnType {
    pub kind: ColumnKind,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl ColumnType {
    pub fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            precision: None,
            scale: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ColumnKind::String)
    }

    pub fn int() -> Self {
        Self::new(ColumnKind::Int)
    }

    pub fn float() -> Self {
        Self::new(ColumnKind::Float)
    }

    pub fn bool() -> Self {
        Self::new(ColumnKind::Bool)
    }

    pub fn date() -> Self {
        Self::new(ColumnKind::Date)
    }

    pub fn timestamp() -> Self {
        Self::new(ColumnKind::Timestamp)
    }

    pub fn numeric(precision: u32, scale: u32) -> Self {
        Self {
            kind: ColumnKind::Numeric,
            precision: Some(precision),
            scale: Some(scale),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.precision, self.scale) {
            (Some(p), Some(s)) => write!(f, "{}({p}, {s})", self.kind),
            (Some(p), None) => write!(f, "{}({p})", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Ordered set of named, typed output columns. Immutable once a job has
/// finished defining it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema through a configuration closure:
    ///
    /// ```
    /// use etl_core::schema::{ColumnType, Schema};
    ///
    /// let schema = Schema::define(|t| {
    ///     t.column("day", ColumnType::date());
    ///     t.column("value_num", ColumnType::numeric(10, 1));
    /// });
    /// assert_eq!(schema.len(), 2);
    /// ```
    pub fn define(configure: impl FnOnce(&mut Schema)) -> Self {
        let mut schema = Schema::new();
        configure(&mut schema);
        schema
    }

    /// Appends a column. Redefining an existing name replaces its type and
    /// keeps the original position.
    pub fn column(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut Self {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column_type,
            None => self.columns.push((name, column_type)),
        }
        self
    }

    pub fn column_type(&self, name: &str) -> Option<&ColumnType> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnType)> {
        self.columns.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Shapes an input row to this schema's column set.
    ///
    /// The output has exactly the schema's columns in schema order. Columns
    /// absent from the input come out as [`RowValue::Missing`] rather than
    /// being omitted; extra input columns are dropped. Pure, and idempotent
    /// over rows that already match the schema.
    pub fn shape_row(&self, input: &Row) -> Row {
        self.columns
            .iter()
            .map(|(name, _)| {
                let value = input.get(name).cloned().unwrap_or(RowValue::Missing);
                (name.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_schema() -> Schema {
        Schema::define(|t| {
            t.column("day", ColumnType::date());
            t.column("condition", ColumnType::string());
            t.column("value_int", ColumnType::int());
            t.column("value_num", ColumnType::numeric(10, 1));
            t.column("value_float", ColumnType::float());
        })
    }

    #[test]
    fn test_define_preserves_column_order() {
        let schema = weather_schema();
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(
            names,
            vec!["day", "condition", "value_int", "value_num", "value_float"]
        );
    }

    #[test]
    fn test_column_type_display() {
        assert_eq!(ColumnType::numeric(10, 1).to_string(), "numeric(10, 1)");
        assert_eq!(ColumnType::date().to_string(), "date");
    }

    #[test]
    fn test_shape_row_fills_missing_and_drops_extra() {
        let schema = weather_schema();
        let input = Row::new()
            .with("condition", "rain")
            .with("day", "2015-04-01")
            .with("unrelated", 99);

        let shaped = schema.shape_row(&input);

        let names: Vec<&str> = shaped.column_names().collect();
        assert_eq!(
            names,
            vec!["day", "condition", "value_int", "value_num", "value_float"]
        );
        assert_eq!(shaped.get("condition"), Some(&RowValue::from("rain")));
        assert!(shaped.get("value_int").unwrap().is_missing());
        assert!(!shaped.contains("unrelated"));
    }

    #[test]
    fn test_shape_row_is_idempotent() {
        let schema = weather_schema();
        let input = Row::new().with("day", "2015-04-01").with("value_int", 3);
        let once = schema.shape_row(&input);
        let twice = schema.shape_row(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_redefining_column_keeps_position() {
        let mut schema = weather_schema();
        schema.column("condition", ColumnType::int());
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(names[1], "condition");
        assert_eq!(
            schema.column_type("condition"),
            Some(&ColumnType::int())
        );
    }
}
