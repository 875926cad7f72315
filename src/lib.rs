#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # ETL Core
//!
//! Batch ETL job execution engine: jobs read rows from a source, shape each
//! row against a declared output schema, load rows into a destination, and
//! record the outcome of every run (status, row counts, timing) as a
//! persisted audit trail keyed by a deterministic batch identity.
//!
//! ## Overview
//!
//! The core is input/output-agnostic. A job brings a [`input::RowSource`],
//! a [`schema::Schema`], a destination, and its own `run_internal` logic;
//! the [`job::JobRunner`] owns the lifecycle around it:
//!
//! ```text
//! create (new) -> running -> success | error
//! ```
//!
//! Every transition is persisted as it happens through a
//! [`repository::RunRepository`], so a crash mid-run is externally
//! observable as a record stuck in `running` -- an operational signal, not
//! something the core recovers automatically.
//!
//! Batches are mappings like `{year, month, day}`. Their derived identity
//! string ([`batch::Batch::id`]) is deterministic and insertion-order
//! independent, which makes it the natural key for "has this batch already
//! been run". The core itself never dedups; it exposes the lookup seam and
//! leaves the policy to the surrounding scheduler.
//!
//! ## Module Organization
//!
//! - [`batch`] - Batch mapping and deterministic identity derivation
//! - [`schema`] - Declared output columns and row shaping
//! - [`row`] - Row/value model with an explicit missing-column sentinel
//! - [`models`] - Job and JobRun records, run status lifecycle
//! - [`repository`] - Registry and run-audit persistence seams
//! - [`input`] / [`output`] - Row source and sink contracts
//! - [`job`] - The `EtlJob` contract and the `JobRunner` orchestrator
//! - [`logging`] - Structured per-run log context
//! - [`config`] - Process configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use etl_core::batch::Batch;
//! use etl_core::job::JobRunner;
//! use etl_core::repository::MemoryRepository;
//!
//! # async fn example(mut job: impl etl_core::job::EtlJob) -> etl_core::Result<()> {
//! etl_core::logging::init_logging();
//!
//! let repo = Arc::new(MemoryRepository::new());
//! let mut runner = JobRunner::new(repo.clone(), repo);
//!
//! let batch = Batch::new().with("day", "2015-03-31");
//! let run = runner.run(&mut job, &batch).await?;
//! println!("{} rows loaded", run.num_rows_success.unwrap_or(0));
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod input;
pub mod job;
pub mod logging;
pub mod models;
pub mod output;
pub mod repository;
pub mod row;
pub mod schema;

pub use batch::Batch;
pub use config::EtlConfig;
pub use error::{EtlError, Result};
pub use job::{EtlJob, JobRunner, LoadStrategy};
pub use models::{Job, JobRun, RunResult, RunStatus};
pub use row::{Row, RowValue};
pub use schema::{ColumnKind, ColumnType, Schema};
