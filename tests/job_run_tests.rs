//! Job run lifecycle integration tests.
//!
//! Exercises the full orchestration path over the in-memory repository: a
//! fixed-result job covering the audit-trail scenarios, and a pipeline job
//! that drives a real reader through shaping into a sink.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use etl_core::batch::Batch;
use etl_core::error::EtlError;
use etl_core::input::{MemoryRowSource, RowSource};
use etl_core::job::{EtlJob, JobRunner, LoadStrategy};
use etl_core::models::{RunResult, RunStatus};
use etl_core::output::{MemoryRowSink, RowSink};
use etl_core::repository::{JobRegistry, MemoryRepository, RunRepository};
use etl_core::row::Row;
use etl_core::schema::{ColumnType, Schema};
use etl_core::Result;

/// Job that reports a canned result, or fails with a canned message.
struct DummyJob {
    schema: Schema,
    num_rows_success: i64,
    num_rows_error: i64,
    message: String,
    exception: Option<String>,
}

impl DummyJob {
    fn new(num_rows_success: i64, num_rows_error: i64, message: &str) -> Self {
        Self {
            schema: Schema::new(),
            num_rows_success,
            num_rows_error,
            message: message.to_string(),
            exception: None,
        }
    }

    fn raising(mut self, message: &str) -> Self {
        self.exception = Some(message.to_string());
        self
    }
}

#[async_trait]
impl EtlJob for DummyJob {
    fn class_name(&self) -> &str {
        "DummyJob"
    }

    fn feed_name(&self) -> &str {
        "dummy"
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn run_internal(&mut self, _batch: &Batch) -> Result<RunResult> {
        if let Some(message) = &self.exception {
            return Err(EtlError::job(message.clone()));
        }
        Ok(RunResult::new(
            self.num_rows_success,
            self.num_rows_error,
            self.message.clone(),
        ))
    }
}

/// Job that pulls every row from its reader, shapes it, and writes it to an
/// in-memory sink.
struct WeatherLoadJob {
    schema: Schema,
    reader: MemoryRowSource,
    sink: MemoryRowSink,
}

impl WeatherLoadJob {
    fn new(reader: MemoryRowSource) -> Self {
        Self {
            schema: Schema::define(|t| {
                t.column("day", ColumnType::date());
                t.column("condition", ColumnType::string());
                t.column("value_int", ColumnType::int());
            }),
            reader,
            sink: MemoryRowSink::new(),
        }
    }
}

#[async_trait]
impl EtlJob for WeatherLoadJob {
    fn class_name(&self) -> &str {
        "WeatherLoadJob"
    }

    fn feed_name(&self) -> &str {
        "weather"
    }

    fn load_strategy(&self) -> LoadStrategy {
        LoadStrategy::InsertAppend
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn reader(&self) -> Option<&dyn RowSource> {
        Some(&self.reader)
    }

    async fn run_internal(&mut self, _batch: &Batch) -> Result<RunResult> {
        let mut loaded = 0;
        while let Some(row) = self.reader.next_row().await? {
            let shaped = self.read_input_row(row)?;
            self.sink.write_row(shaped).await?;
            loaded += 1;
        }
        self.sink.flush().await?;
        Ok(RunResult::new(loaded, 0, format!("loaded {loaded} rows")))
    }
}

fn weather_rows() -> Vec<Row> {
    vec![
        Row::new().with("day", "2015-04-01").with("condition", "rain"),
        Row::new()
            .with("day", "2015-04-02")
            .with("condition", "snow")
            .with("value_int", 3),
        Row::new()
            .with("day", "2015-04-03")
            .with("condition", "sun")
            .with("extra", "dropped"),
    ]
}

fn runner_with_memory() -> (JobRunner, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let runner = JobRunner::new(repo.clone(), repo.clone());
    (runner, repo)
}

#[tokio::test]
async fn creates_run_record_for_job() -> anyhow::Result<()> {
    let repo = MemoryRepository::new();
    let job = repo.register("DummyJob").await?;
    let batch = Batch::new().with("day", "2015-03-31");

    let run = repo.create_run(&job, &batch).await?;

    assert_eq!(run.job_id, job.job_id);
    assert_eq!(run.status, RunStatus::New);
    assert!(run.run_start_time.is_none());
    assert_eq!(run.batch, batch.to_json()?);
    Ok(())
}

#[tokio::test]
async fn runs_job_success() -> anyhow::Result<()> {
    let (mut runner, repo) = runner_with_memory();
    let mut job = DummyJob::new(34, 1, "congrats!");
    let batch = Batch::new().with("day", "2015-03-31");

    let started = Utc::now();
    let run = runner.run(&mut job, &batch).await?;

    assert_eq!(run.status, RunStatus::Success);
    assert_eq!(run.num_rows_success, Some(34));
    assert_eq!(run.num_rows_error, Some(1));
    assert_eq!(run.message.as_deref(), Some("congrats!"));
    assert_eq!(run.batch, r#"{"day":"2015-03-31"}"#);
    assert!(run.run_start_time.unwrap() >= started);
    assert!(run.run_end_time.unwrap() >= run.run_start_time.unwrap());

    // and the same record is what a later reader sees in the store
    let stored = repo.find_by_job(run.job_id).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], run);
    Ok(())
}

#[tokio::test]
async fn runs_job_error() -> anyhow::Result<()> {
    let (mut runner, repo) = runner_with_memory();
    let mut job = DummyJob::new(1, 100, "unused").raising("abort!");
    let batch = Batch::new().with("day", "2015-03-31");

    let err = runner.run(&mut job, &batch).await.unwrap_err();
    assert_eq!(err.to_string(), "abort!");

    // the run record was finalized before the failure surfaced
    let run = runner.current_run().expect("finalized run is retained");
    assert_eq!(run.status, RunStatus::Error);
    assert_eq!(run.message.as_deref(), Some("abort!"));
    assert!(run.num_rows_success.is_none());
    assert!(run.num_rows_error.is_none());
    assert_eq!(run.batch, r#"{"day":"2015-03-31"}"#);
    assert!(run.run_end_time.unwrap() >= run.run_start_time.unwrap());

    let stored = repo.find_by_job(run.job_id).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(&stored[0], run);
    Ok(())
}

#[tokio::test]
async fn reader_driven_job_counts_and_shapes_rows() -> anyhow::Result<()> {
    let (mut runner, _repo) = runner_with_memory();
    let mut job = WeatherLoadJob::new(MemoryRowSource::new(weather_rows()));
    let batch = Batch::new().with("day", "2015-04-01");

    let run = runner.run(&mut job, &batch).await?;

    assert_eq!(run.status, RunStatus::Success);
    assert_eq!(run.num_rows_success, Some(3));
    assert_eq!(run.num_rows_error, Some(0));

    // every written row has exactly the schema's columns, in schema order
    assert_eq!(job.sink.len(), 3);
    for row in job.sink.rows() {
        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["day", "condition", "value_int"]);
    }
    // absent input columns came through as the missing sentinel
    assert!(job.sink.rows()[0].get("value_int").unwrap().is_missing());
    // extra input columns were dropped
    assert!(!job.sink.rows()[2].contains("extra"));
    Ok(())
}

#[tokio::test]
async fn empty_reader_is_success_with_zero_rows() -> anyhow::Result<()> {
    let (mut runner, _repo) = runner_with_memory();
    let mut job = WeatherLoadJob::new(MemoryRowSource::empty());
    let batch = Batch::new().with("day", "2015-04-01");

    let run = runner.run(&mut job, &batch).await?;

    assert_eq!(run.status, RunStatus::Success);
    assert_eq!(run.num_rows_success, Some(0));
    assert_eq!(run.num_rows_error, Some(0));
    assert!(job.sink.is_empty());
    Ok(())
}

#[tokio::test]
async fn reader_failure_mid_sequence_finalizes_error() -> anyhow::Result<()> {
    let (mut runner, _repo) = runner_with_memory();
    let reader = MemoryRowSource::new(weather_rows()).failing_after(2);
    let mut job = WeatherLoadJob::new(reader);
    let batch = Batch::new().with("day", "2015-04-01");

    let err = runner.run(&mut job, &batch).await.unwrap_err();
    assert!(matches!(err, EtlError::Input { .. }));

    let run = runner.current_run().expect("finalized run is retained");
    assert_eq!(run.status, RunStatus::Error);
    assert!(run.num_rows_success.is_none());
    // the two rows read before the failure made it to the sink
    assert_eq!(job.sink.len(), 2);
    Ok(())
}

#[tokio::test]
async fn same_batch_twice_creates_two_records() -> anyhow::Result<()> {
    let (mut runner, repo) = runner_with_memory();
    let batch = Batch::new().with("day", "2015-03-31");

    let mut first = DummyJob::new(1, 0, "one");
    let mut second = DummyJob::new(2, 0, "two");
    let a = runner.run(&mut first, &batch).await?;
    let b = runner.run(&mut second, &batch).await?;

    assert_ne!(a.job_run_id, b.job_run_id);
    assert_eq!(repo.run_count(), 2);

    // a collaborator that wants idempotency checks the identity seam first
    let existing = repo.find_by_batch_id(a.job_id, &batch.id()).await?;
    assert_eq!(existing.len(), 2);
    Ok(())
}

#[tokio::test]
async fn registration_is_shared_across_runs() -> anyhow::Result<()> {
    let (mut runner, repo) = runner_with_memory();
    let batch = Batch::new().with("day", "2015-03-31");

    let mut first = DummyJob::new(1, 0, "one");
    let mut second = DummyJob::new(2, 0, "two");
    let a = runner.run(&mut first, &batch).await?;
    let b = runner.run(&mut second, &batch).await?;

    assert_eq!(a.job_id, b.job_id);
    let job = repo.find_by_class_name("DummyJob").await?.unwrap();
    assert_eq!(job.job_id, a.job_id);
    Ok(())
}
