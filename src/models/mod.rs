pub mod job;
pub mod job_run;

// Re-export core models for easy access
pub use job::Job;
pub use job_run::{JobRun, RunResult, RunStatus};
