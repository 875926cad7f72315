//! Postgres repository backed by sqlx.
//!
//! Queries use the runtime binding API rather than the compile-time macros
//! so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::batch::Batch;
use crate::error::{EtlError, Result};
use crate::models::{Job, JobRun, RunResult, RunStatus};

use super::{batch_id_matches, JobRegistry, RunRepository};

/// Schema for the audit tables. Applied by [`PgRepository::ensure_schema`];
/// deployments with managed migrations can run the equivalent DDL there.
const SCHEMA_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS etl_jobs (
    job_id      BIGSERIAL PRIMARY KEY,
    class_name  VARCHAR NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS etl_job_runs (
    job_run_id        BIGSERIAL PRIMARY KEY,
    job_id            BIGINT NOT NULL REFERENCES etl_jobs (job_id),
    batch             VARCHAR NOT NULL,
    status            VARCHAR NOT NULL,
    run_start_time    TIMESTAMPTZ,
    run_end_time      TIMESTAMPTZ,
    num_rows_success  BIGINT,
    num_rows_error    BIGINT,
    message           VARCHAR
);

CREATE INDEX IF NOT EXISTS idx_etl_job_runs_job_id ON etl_job_runs (job_id);
"#;

/// [`JobRegistry`] and [`RunRepository`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct JobRecord {
    job_id: i64,
    class_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobRecord> for Job {
    fn from(record: JobRecord) -> Self {
        Job {
            job_id: record.job_id,
            class_name: record.class_name,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct JobRunRecord {
    job_run_id: i64,
    job_id: i64,
    batch: String,
    status: String,
    run_start_time: Option<DateTime<Utc>>,
    run_end_time: Option<DateTime<Utc>>,
    num_rows_success: Option<i64>,
    num_rows_error: Option<i64>,
    message: Option<String>,
}

impl TryFrom<JobRunRecord> for JobRun {
    type Error = EtlError;

    fn try_from(record: JobRunRecord) -> Result<Self> {
        let status: RunStatus = record.status.parse().map_err(|e| EtlError::Database {
            message: format!("invalid status in database: {e}"),
        })?;
        Ok(JobRun {
            job_run_id: record.job_run_id,
            job_id: record.job_id,
            batch: record.batch,
            status,
            run_start_time: record.run_start_time,
            run_end_time: record.run_end_time,
            num_rows_success: record.num_rows_success,
            num_rows_error: record.num_rows_error,
            message: record.message,
        })
    }
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the audit tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA_DDL.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Writes the full mutable tail of a run record. Lifecycle legality was
    /// already enforced in memory by the [`JobRun`] transition methods.
    async fn update_run(&self, run: &JobRun) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE etl_job_runs
            SET status = $2,
                run_start_time = $3,
                run_end_time = $4,
                num_rows_success = $5,
                num_rows_error = $6,
                message = $7
            WHERE job_run_id = $1
            "#,
        )
        .bind(run.job_run_id)
        .bind(run.status.to_string())
        .bind(run.run_start_time)
        .bind(run.run_end_time)
        .bind(run.num_rows_success)
        .bind(run.num_rows_error)
        .bind(run.message.clone())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl JobRegistry for PgRepository {
    async fn register(&self, class_name: &str) -> Result<Job> {
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            INSERT INTO etl_jobs (class_name)
            VALUES ($1)
            ON CONFLICT (class_name) DO UPDATE SET updated_at = now()
            RETURNING job_id, class_name, created_at, updated_at
            "#,
        )
        .bind(class_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    async fn find_by_class_name(&self, class_name: &str) -> Result<Option<Job>> {
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            SELECT job_id, class_name, created_at, updated_at
            FROM etl_jobs
            WHERE class_name = $1
            "#,
        )
        .bind(class_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Into::into))
    }
}

#[async_trait]
impl RunRepository for PgRepository {
    async fn create_run(&self, job: &Job, batch: &Batch) -> Result<JobRun> {
        let record = sqlx::query_as::<_, JobRunRecord>(
            r#"
            INSERT INTO etl_job_runs (job_id, batch, status)
            VALUES ($1, $2, $3)
            RETURNING job_run_id, job_id, batch, status,
                      run_start_time, run_end_time,
                      num_rows_success, num_rows_error, message
            "#,
        )
        .bind(job.job_id)
        .bind(batch.to_json()?)
        .bind(RunStatus::New.to_string())
        .fetch_one(&self.pool)
        .await?;
        record.try_into()
    }

    async fn set_running(&self, run: &mut JobRun) -> Result<()> {
        run.start()?;
        self.update_run(run).await
    }

    async fn set_success(&self, run: &mut JobRun, result: &RunResult) -> Result<()> {
        run.finish_success(result)?;
        self.update_run(run).await
    }

    async fn set_error(&self, run: &mut JobRun, result: &RunResult) -> Result<()> {
        run.finish_error(result)?;
        self.update_run(run).await
    }

    async fn find_by_job(&self, job_id: i64) -> Result<Vec<JobRun>> {
        let records = sqlx::query_as::<_, JobRunRecord>(
            r#"
            SELECT job_run_id, job_id, batch, status,
                   run_start_time, run_end_time,
                   num_rows_success, num_rows_error, message
            FROM etl_job_runs
            WHERE job_id = $1
            ORDER BY job_run_id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        records.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_batch_id(&self, job_id: i64, batch_id: &str) -> Result<Vec<JobRun>> {
        // Batch identity is derived, not stored; filter on the decoded batch.
        let runs = self.find_by_job(job_id).await?;
        Ok(runs
            .into_iter()
            .filter(|r| batch_id_matches(r, batch_id))
            .collect())
    }
}
