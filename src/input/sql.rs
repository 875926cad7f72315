//! SQL query row source over a Postgres pool.
//!
//! Supports raw SQL with positional bind parameters. Rows are fetched on the
//! first pull and handed out one at a time so the source-order contract and
//! the running row count behave the same as any other source.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row as _};
use tracing::debug;

use crate::error::Result;
use crate::row::{Row, RowValue};

use super::RowSource;

/// Row source executing one SQL query against a Postgres pool.
pub struct SqlRowSource {
    pool: PgPool,
    sql: String,
    params: Vec<Value>,
    label: Option<String>,
    fetched: Option<VecDeque<Row>>,
    rows_processed: u64,
}

impl SqlRowSource {
    pub fn new(pool: PgPool, sql: impl Into<String>) -> Self {
        Self {
            pool,
            sql: sql.into(),
            params: Vec::new(),
            label: None,
            fetched: None,
            rows_processed: 0,
        }
    }

    /// Appends a positional bind parameter.
    pub fn bind(mut self, param: impl Into<Value>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Sets the display name used in logs, e.g. the connection descriptor
    /// `"warehouse/analytics"`.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    async fn fetch(&mut self) -> Result<VecDeque<Row>> {
        debug!(
            sql = %self.sql,
            params = self.params.len(),
            "executing input query"
        );
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                Value::Null => query.bind(Option::<String>::None),
                Value::Bool(b) => query.bind(*b),
                Value::Number(n) if n.is_i64() => query.bind(n.as_i64()),
                Value::Number(n) => query.bind(n.as_f64()),
                Value::String(s) => query.bind(s.clone()),
                other => query.bind(other.clone()),
            };
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

#[async_trait]
impl RowSource for SqlRowSource {
    fn name(&self) -> String {
        match &self.label {
            Some(label) => format!("sql {label}"),
            None => "sql".to_string(),
        }
    }

    fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    async fn next_row(&mut self) -> Result<Option<Row>> {
        if self.fetched.is_none() {
            let rows = self.fetch().await?;
            self.fetched = Some(rows);
        }
        let Some(buffered) = self.fetched.as_mut() else {
            return Ok(None);
        };
        match buffered.pop_front() {
            Some(row) => {
                self.rows_processed += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }
}

fn decode_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| (column.name().to_string(), decode_column(row, index)))
        .collect()
}

/// Decodes one column into the pipeline value model, trying the common
/// scalar types in order. Column types outside this set decode as null.
fn decode_column(row: &PgRow, index: usize) -> RowValue {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return option_value(value.map(Value::from));
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return option_value(value.map(Value::from));
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return option_value(value.map(|v| Value::from(i64::from(v))));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return option_value(value.map(Value::from));
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
        return option_value(value.map(|v| Value::from(f64::from(v))));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return option_value(value.map(Value::from));
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return option_value(value.map(Value::from));
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return option_value(value.map(|v| Value::from(v.to_rfc3339())));
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return option_value(value.map(|v| Value::from(v.to_string())));
    }
    if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(index) {
        return option_value(value.map(|v| Value::from(v.to_string())));
    }
    if let Ok(value) = row.try_get::<Option<Value>, _>(index) {
        return option_value(value);
    }
    RowValue::null()
}

fn option_value(value: Option<Value>) -> RowValue {
    RowValue::Value(value.unwrap_or(Value::Null))
}
