//! Job model: one row per registered job class.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered, named unit of ETL logic. Created on first registration of
/// its class name and immutable thereafter; owns zero or more job runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: i64,
    pub class_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

