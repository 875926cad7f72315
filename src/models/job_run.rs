//! JobRun model: one timed, status-tracked execution attempt of a job for
//! a batch, persisted as the audit trail of what ran and how it went.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EtlError, Result};

/// Run lifecycle states. The lifecycle is linear with two terminal states:
/// `new -> running -> {success, error}`, no re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Initial state when the run record is created
    New,
    /// Job logic is currently executing
    Running,
    /// Run completed normally with row counts
    Success,
    /// Run failed; message captured, counts unset
    Error,
}

impl RunStatus {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }

    /// Check if this is an active state (job logic is executing)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the lifecycle permits moving from this state to `next`.
    /// Transitions are monotonic and one-directional.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (Self::New, Self::Running)
                | (Self::Running, Self::Success)
                | (Self::Running, Self::Error)
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid run status: {s}")),
        }
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::New
    }
}

/// Ephemeral outcome payload produced by a job's internal run logic and
/// consumed exactly once to finalize a run record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub num_rows_success: i64,
    pub num_rows_error: i64,
    pub message: String,
}

impl RunResult {
    pub fn new(num_rows_success: i64, num_rows_error: i64, message: impl Into<String>) -> Self {
        Self {
            num_rows_success,
            num_rows_error,
            message: message.into(),
        }
    }

    /// Result carrying only a failure message; the counts are never read on
    /// the error path.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// One execution attempt of one job for one batch.
///
/// Created in `new` state with no timestamps. `start` stamps the start time,
/// `finish_success`/`finish_error` stamp the end time and outcome. Once a
/// terminal transition happens the record is never mutated again; invalid
/// transitions are rejected with [`EtlError::StateTransition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    pub job_run_id: i64,
    pub job_id: i64,
    /// Serialized batch (canonical key-sorted JSON).
    pub batch: String,
    pub status: RunStatus,
    pub run_start_time: Option<DateTime<Utc>>,
    pub run_end_time: Option<DateTime<Utc>>,
    pub num_rows_success: Option<i64>,
    pub num_rows_error: Option<i64>,
    pub message: Option<String>,
}

impl JobRun {
    /// Fresh record in `new` state, as created by a repository.
    pub fn new(job_run_id: i64, job_id: i64, batch: impl Into<String>) -> Self {
        Self {
            job_run_id,
            job_id,
            batch: batch.into(),
            status: RunStatus::New,
            run_start_time: None,
            run_end_time: None,
            num_rows_success: None,
            num_rows_error: None,
            message: None,
        }
    }

    fn transition_to(&mut self, next: RunStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EtlError::StateTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Marks the run as executing and stamps the start time.
    pub fn start(&mut self) -> Result<()> {
        self.transition_to(RunStatus::Running)?;
        self.run_start_time = Some(Utc::now());
        Ok(())
    }

    /// Terminal transition for a normal completion: stamps the end time and
    /// copies row counts and message from the result.
    pub fn finish_success(&mut self, result: &RunResult) -> Result<()> {
        self.transition_to(RunStatus::Success)?;
        self.run_end_time = Some(Utc::now());
        self.num_rows_success = Some(result.num_rows_success);
        self.num_rows_error = Some(result.num_rows_error);
        self.message = Some(result.message.clone());
        Ok(())
    }

    /// Terminal transition for a failure: stamps the end time and the
    /// message. Row counts stay unset -- the run never reached completion
    /// accounting.
    pub fn finish_error(&mut self, result: &RunResult) -> Result<()> {
        self.transition_to(RunStatus::Error)?;
        self.run_end_time = Some(Utc::now());
        self.message = Some(result.message.clone());
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wall-clock duration, available once both timestamps are set.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.run_start_time, self.run_end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}
