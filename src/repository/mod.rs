//! # Repositories
//!
//! Persistence seams for jobs and job runs:
//! - [`JobRegistry`] - idempotent registration of job classes
//! - [`RunRepository`] - durable audit trail of job runs
//! - [`MemoryRepository`] - in-memory implementation for tests and
//!   embedded use
//! - `PgRepository` - sqlx/Postgres implementation (feature `postgres`)
//!
//! Every repository call is atomic and immediately durable; the core relies
//! on that when it persists each lifecycle transition as it happens.

use async_trait::async_trait;

use crate::batch::Batch;
use crate::error::Result;
use crate::models::{Job, JobRun, RunResult};

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryRepository;
#[cfg(feature = "postgres")]
pub use postgres::PgRepository;

/// Registry of job classes. Registration is idempotent: repeated
/// registration of the same class name returns the same logical job.
#[async_trait]
pub trait JobRegistry: Send + Sync {
    async fn register(&self, class_name: &str) -> Result<Job>;

    async fn find_by_class_name(&self, class_name: &str) -> Result<Option<Job>>;
}

/// Durable store for job run records.
///
/// The transition methods mutate the given record in memory (through the
/// [`JobRun`] lifecycle methods, which enforce monotonicity) and persist the
/// updated record before returning. A record handed back by `create_run` is
/// exclusively owned by the single `run` invocation that created it; no
/// other writer mutates the same run.
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Persists a new run for `job` in `new` state with the batch stored in
    /// canonical serialized form.
    async fn create_run(&self, job: &Job, batch: &Batch) -> Result<JobRun>;

    /// Transitions the run to `running` and persists the start time.
    async fn set_running(&self, run: &mut JobRun) -> Result<()>;

    /// Terminal `success` transition; persists end time, counts and message.
    async fn set_success(&self, run: &mut JobRun, result: &RunResult) -> Result<()>;

    /// Terminal `error` transition; persists end time and message.
    async fn set_error(&self, run: &mut JobRun, result: &RunResult) -> Result<()>;

    /// All runs recorded for a job, oldest first.
    async fn find_by_job(&self, job_id: i64) -> Result<Vec<JobRun>>;

    /// Runs for a job whose batch derives the given identity string. This is
    /// the seam a surrounding orchestrator uses to decide whether a batch
    /// has already been run; the core itself never blocks a duplicate.
    async fn find_by_batch_id(&self, job_id: i64, batch_id: &str) -> Result<Vec<JobRun>>;
}

/// Shared filter helper: does a stored run's serialized batch derive the
/// given identity?
pub(crate) fn batch_id_matches(run: &JobRun, batch_id: &str) -> bool {
    Batch::from_json(&run.batch)
        .map(|b| b.id() == batch_id)
        .unwrap_or(false)
}
