//! # Output
//!
//! The write side of a job: a [`RowSink`] consumes shaped rows one at a
//! time. Concrete destinations (relational insert, warehouse load) live with
//! their drivers; this module carries the contract plus the small sinks the
//! core's own tests and file-based jobs use.

use async_trait::async_trait;

use crate::error::Result;
use crate::row::Row;

mod file;
mod memory;

pub use file::JsonLinesSink;
pub use memory::MemoryRowSink;

/// Row-consuming destination interface.
#[async_trait]
pub trait RowSink: Send {
    /// Display name identifying the destination in logs.
    fn name(&self) -> String;

    /// Writes one shaped row. Rows arrive in source order, one at a time.
    async fn write_row(&mut self, row: Row) -> Result<()>;

    /// Flushes any buffered writes. Called once after the last row.
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
