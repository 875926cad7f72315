//! Job runner: executes one job for one batch, keeping the run record's
//! status updated and capturing failures.

use std::sync::Arc;

use crate::batch::Batch;
use crate::error::Result;
use crate::logging::RunLogContext;
use crate::models::{Job, JobRun, RunResult};
use crate::repository::{JobRegistry, RunRepository};

use super::EtlJob;

/// Orchestrates job executions against a registry and a run repository.
///
/// Each [`run`](JobRunner::run) call creates exactly one run record and
/// performs exactly one terminal transition on it. Nothing here dedups
/// batches: running the same batch twice creates two records, and a
/// surrounding scheduler that wants idempotency checks
/// [`RunRepository::find_by_batch_id`] first.
pub struct JobRunner {
    registry: Arc<dyn JobRegistry>,
    repository: Arc<dyn RunRepository>,
    current_run: Option<JobRun>,
}

impl JobRunner {
    pub fn new(registry: Arc<dyn JobRegistry>, repository: Arc<dyn RunRepository>) -> Self {
        Self {
            registry,
            repository,
            current_run: None,
        }
    }

    /// The most recent run record this runner touched, kept up to date
    /// through every transition. After a failed `run` call this is the
    /// finalized `error` record the returned failure refers to.
    pub fn current_run(&self) -> Option<&JobRun> {
        self.current_run.as_ref()
    }

    /// Runs `job` for `batch`.
    ///
    /// Lifecycle: register the job class (idempotent), create the run
    /// record, transition it to `running`, invoke the job's internal
    /// execution, then finalize with `success` or `error`. On failure the
    /// original error is returned only after the run record is finalized,
    /// so the audit trail never loses a failed run; if persisting the
    /// `error` transition itself fails, that repository error is returned
    /// instead and masks the original.
    pub async fn run(&mut self, job: &mut dyn EtlJob, batch: &Batch) -> Result<JobRun> {
        self.current_run = None;

        let model = self.registry.register(job.class_name()).await?;
        let mut run = self.repository.create_run(&model, batch).await?;

        log_context(job, &model, batch).info("Running...");
        self.repository.set_running(&mut run).await?;
        self.current_run = Some(run.clone());

        match job.run_internal(batch).await {
            Ok(result) => {
                log_context(job, &model, batch).info(&format!("Success! {}", result.message));
                self.repository.set_success(&mut run, &result).await?;
                self.current_run = Some(run.clone());
                Ok(run)
            }
            Err(err) => {
                // Finalize before surfacing the failure; the caller decides
                // whether the overall operation is fatal. Not logged here.
                let result = RunResult::from_message(err.to_string());
                self.repository.set_error(&mut run, &result).await?;
                self.current_run = Some(run);
                Err(err)
            }
        }
    }
}

/// Builds the structured log attributes for one emission. Recomputed per
/// call so reader progress is current.
fn log_context(job: &dyn EtlJob, model: &Job, batch: &Batch) -> RunLogContext {
    let (input_rows_processed, input_name) = match job.reader() {
        Some(reader) => (Some(reader.rows_processed()), Some(reader.name())),
        None => (None, None),
    };
    RunLogContext::new(
        job.name(),
        job.feed_name(),
        job.load_strategy().to_string(),
        model.class_name.clone(),
        input_rows_processed,
        input_name,
        batch,
    )
}
