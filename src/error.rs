//! # Error Types
//!
//! Structured error handling for the ETL core using thiserror
//! for typed errors instead of `Box<dyn Error>` patterns.

use thiserror::Error;

use crate::models::job_run::RunStatus;

/// Errors produced by the ETL core and its collaborators.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("database error: {message}")]
    Database { message: String },

    #[error("invalid run state transition: {from} -> {to}")]
    StateTransition { from: RunStatus, to: RunStatus },

    #[error("serialization error: {message}")]
    Serialization { message: String },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("input error: {source_name}: {message}")]
    Input {
        source_name: String,
        message: String,
    },

    #[error("output error: {sink_name}: {message}")]
    Output { sink_name: String, message: String },

    /// Failure raised by job-specific execution logic. Displays as the bare
    /// message so run records carry exactly what the job reported.
    #[error("{message}")]
    Job { message: String },
}

impl EtlError {
    /// Shorthand for a job-level failure.
    pub fn job(message: impl Into<String>) -> Self {
        Self::Job {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_displays_bare_message() {
        let err = EtlError::job("abort!");
        assert_eq!(err.to_string(), "abort!");
    }

    #[test]
    fn test_state_transition_error_display() {
        let err = EtlError::StateTransition {
            from: RunStatus::Success,
            to: RunStatus::Running,
        };
        assert_eq!(
            err.to_string(),
            "invalid run state transition: success -> running"
        );
    }
}
