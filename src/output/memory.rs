//! In-memory row sink for tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::row::Row;

use super::RowSink;

/// Collects written rows for later inspection.
#[derive(Debug, Default)]
pub struct MemoryRowSink {
    rows: Vec<Row>,
}

impl MemoryRowSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl RowSink for MemoryRowSink {
    fn name(&self) -> String {
        "memory".to_string()
    }

    async fn write_row(&mut self, row: Row) -> Result<()> {
        self.rows.push(row);
        Ok(())
    }
}
