//! In-memory row source for tests and small fixed feeds.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::{EtlError, Result};
use crate::row::Row;

use super::RowSource;

/// Serves a fixed set of rows, optionally failing after a given number of
/// rows to exercise mid-sequence input failures.
#[derive(Debug, Default)]
pub struct MemoryRowSource {
    rows: VecDeque<Row>,
    rows_processed: u64,
    fail_after: Option<u64>,
}

impl MemoryRowSource {
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
            rows_processed: 0,
            fail_after: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Makes the source raise an input error once `count` rows have been
    /// produced.
    pub fn failing_after(mut self, count: u64) -> Self {
        self.fail_after = Some(count);
        self
    }
}

#[async_trait]
impl RowSource for MemoryRowSource {
    fn name(&self) -> String {
        "memory".to_string()
    }

    fn rows_processed(&self) -> u64 {
        self.rows_processed
    }

    async fn next_row(&mut self) -> Result<Option<Row>> {
        if self.fail_after == Some(self.rows_processed) {
            return Err(EtlError::Input {
                source_name: self.name(),
                message: format!("source failed after {} rows", self.rows_processed),
            });
        }
        match self.rows.pop_front() {
            Some(row) => {
                self.rows_processed += 1;
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_yields_rows_in_order_and_counts() {
        let mut source = MemoryRowSource::new(vec![
            Row::new().with("n", 1),
            Row::new().with("n", 2),
        ]);
        assert_eq!(source.rows_processed(), 0);

        let first = source.next_row().await.unwrap().unwrap();
        assert_eq!(first.get("n").unwrap().as_value().unwrap(), 1);
        assert_eq!(source.rows_processed(), 1);

        source.next_row().await.unwrap().unwrap();
        assert!(source.next_row().await.unwrap().is_none());
        assert_eq!(source.rows_processed(), 2);
    }

    #[tokio::test]
    async fn test_empty_source_is_not_an_error() {
        let mut source = MemoryRowSource::empty();
        assert!(source.next_row().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fail_after_raises_mid_sequence() {
        let mut source = MemoryRowSource::new(vec![
            Row::new().with("n", 1),
            Row::new().with("n", 2),
        ])
        .failing_after(1);

        assert!(source.next_row().await.is_ok());
        let err = source.next_row().await.unwrap_err();
        assert!(matches!(err, EtlError::Input { .. }));
    }
}
