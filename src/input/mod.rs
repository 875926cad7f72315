//! # Input
//!
//! The read side of a job: a [`RowSource`] produces rows one at a time, in
//! source order, until exhaustion. Sources track how many rows they have
//! produced so far so the logging context can report progress, and may fail
//! mid-sequence, in which case the failure propagates and no further rows
//! are produced.

use async_trait::async_trait;

use crate::error::Result;
use crate::row::Row;

mod memory;
#[cfg(feature = "postgres")]
mod sql;

pub use memory::MemoryRowSource;
#[cfg(feature = "postgres")]
pub use sql::SqlRowSource;

/// Blocking pull interface over a sequence of rows.
#[async_trait]
pub trait RowSource: Send {
    /// Display name identifying the input in logs, e.g.
    /// `"sql warehouse/analytics"`.
    fn name(&self) -> String;

    /// Rows produced so far by this source.
    fn rows_processed(&self) -> u64;

    /// Produces the next row, or `None` once the source is exhausted.
    async fn next_row(&mut self) -> Result<Option<Row>>;
}
