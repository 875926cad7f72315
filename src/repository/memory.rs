//! In-memory repository for tests and embedded use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::batch::Batch;
use crate::error::Result;
use crate::models::{Job, JobRun, RunResult};

use super::{batch_id_matches, JobRegistry, RunRepository};

/// Process-local implementation of [`JobRegistry`] and [`RunRepository`].
///
/// Backed by `parking_lot` locks; "durability" here is the lifetime of the
/// process, which is what tests need.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    jobs: RwLock<HashMap<String, Job>>,
    runs: RwLock<HashMap<i64, JobRun>>,
    next_job_id: AtomicI64,
    next_run_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored run, as a later reader would see it.
    pub fn get_run(&self, job_run_id: i64) -> Option<JobRun> {
        self.runs.read().get(&job_run_id).cloned()
    }

    pub fn run_count(&self) -> usize {
        self.runs.read().len()
    }

    fn store(&self, run: &JobRun) {
        self.runs.write().insert(run.job_run_id, run.clone());
    }
}

#[async_trait]
impl JobRegistry for MemoryRepository {
    async fn register(&self, class_name: &str) -> Result<Job> {
        let mut jobs = self.jobs.write();
        if let Some(job) = jobs.get(class_name) {
            return Ok(job.clone());
        }
        let now = Utc::now();
        let job = Job {
            job_id: self.next_job_id.fetch_add(1, Ordering::SeqCst) + 1,
            class_name: class_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        jobs.insert(class_name.to_string(), job.clone());
        Ok(job)
    }

    async fn find_by_class_name(&self, class_name: &str) -> Result<Option<Job>> {
        Ok(self.jobs.read().get(class_name).cloned())
    }
}

#[async_trait]
impl RunRepository for MemoryRepository {
    async fn create_run(&self, job: &Job, batch: &Batch) -> Result<JobRun> {
        let run = JobRun::new(
            self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1,
            job.job_id,
            batch.to_json()?,
        );
        self.store(&run);
        Ok(run)
    }

    async fn set_running(&self, run: &mut JobRun) -> Result<()> {
        run.start()?;
        self.store(run);
        Ok(())
    }

    async fn set_success(&self, run: &mut JobRun, result: &RunResult) -> Result<()> {
        run.finish_success(result)?;
        self.store(run);
        Ok(())
    }

    async fn set_error(&self, run: &mut JobRun, result: &RunResult) -> Result<()> {
        run.finish_error(result)?;
        self.store(run);
        Ok(())
    }

    async fn find_by_job(&self, job_id: i64) -> Result<Vec<JobRun>> {
        let mut runs: Vec<JobRun> = self
            .runs
            .read()
            .values()
            .filter(|r| r.job_id == job_id)
            .cloned()
            .collect();
        runs.sort_by_key(|r| r.job_run_id);
        Ok(runs)
    }

    async fn find_by_batch_id(&self, job_id: i64, batch_id: &str) -> Result<Vec<JobRun>> {
        let runs = self.find_by_job(job_id).await?;
        Ok(runs
            .into_iter()
            .filter(|r| batch_id_matches(r, batch_id))
            .collect())
    }
}
