//! # Job
//!
//! The orchestration layer: the [`EtlJob`] contract jobs implement, and the
//! [`JobRunner`] that executes one job for one batch while keeping the run
//! record's lifecycle and the log trail honest.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::batch::Batch;
use crate::error::Result;
use crate::input::RowSource;
use crate::models::RunResult;
use crate::row::Row;
use crate::schema::Schema;

mod runner;

pub use runner::JobRunner;

/// How a job loads rows into its destination. Carried on the job and
/// included in the log context; destinations interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    Unknown,
    InsertAppend,
    InsertTable,
    Upsert,
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::InsertAppend => write!(f, "insert_append"),
            Self::InsertTable => write!(f, "insert_table"),
            Self::Upsert => write!(f, "upsert"),
        }
    }
}

impl Default for LoadStrategy {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Contract implemented by concrete ETL jobs.
///
/// The runner owns the lifecycle (registration, run record, status
/// transitions, logging); implementations own the mechanics of one
/// execution: driving their reader, shaping rows through
/// [`read_input_row`](EtlJob::read_input_row), writing to their destination,
/// and reporting the outcome as a [`RunResult`].
#[async_trait]
pub trait EtlJob: Send {
    /// Identifies the job class in the registry; stable across runs.
    fn class_name(&self) -> &str;

    /// The feed this job loads.
    fn feed_name(&self) -> &str;

    /// Display name of the job; defaults to the feed name.
    fn name(&self) -> &str {
        self.feed_name()
    }

    fn load_strategy(&self) -> LoadStrategy {
        LoadStrategy::Unknown
    }

    /// The declared output schema rows are shaped against.
    fn schema(&self) -> &Schema;

    /// The attached input, if any, used for progress reporting in the log
    /// context.
    fn reader(&self) -> Option<&dyn RowSource> {
        None
    }

    /// Per-row hook applied before default shaping: type coercion, derived
    /// columns. The default is the identity.
    fn transform_row(&self, row: Row) -> Result<Row> {
        Ok(row)
    }

    /// Processes a row read from the input and returns a row with exactly
    /// the schema's columns: the transform hook first, then default shaping.
    fn read_input_row(&self, row: Row) -> Result<Row> {
        let row = self.transform_row(row)?;
        Ok(self.schema().shape_row(&row))
    }

    /// One execution of the job for `batch`: read, shape, load, count.
    /// Failures propagate; the runner records them on the run before the
    /// caller sees them.
    async fn run_internal(&mut self, batch: &Batch) -> Result<RunResult>;
}
