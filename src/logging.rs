//! # Structured Logging Module
//!
//! Environment-aware structured logging for job runs. Every lifecycle
//! emission carries the full run context (job, feed, strategy, reader
//! progress, batch keys) so downstream log storage can filter on any of
//! them.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::batch::Batch;

/// Prefix applied to every batch key in log attributes, so batch fields are
/// greppable in downstream log storage (`batch_day`, `batch_month`, ...).
pub const BATCH_KEY_PREFIX: &str = "batch_";

/// Display value used for `input_name` when a job has no reader attached.
pub const NO_INPUT_NAME: &str = "N/A";

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
///
/// The filter comes from `ETL_LOG_LEVEL` (default `info`); `RUST_LOG` syntax
/// is accepted. Set `ETL_LOG_FORMAT=json` for JSON output suitable for log
/// shipping. Safe to call from multiple entry points; only the first call
/// installs the subscriber.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = std::env::var("ETL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json = std::env::var("ETL_LOG_FORMAT").is_ok_and(|v| v == "json");

        let installed = if json {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_filter(EnvFilter::new(&filter)),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_filter(EnvFilter::new(&filter)),
                )
                .try_init()
        };

        // A global subscriber may already be set by the embedding process;
        // that is not an error.
        if installed.is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}

macro_rules! emit_run_event {
    ($level:ident, $ctx:expr, $message:expr) => {
        tracing::$level!(
            job_name = %$ctx.job_name,
            feed_name = %$ctx.feed_name,
            load_strategy = %$ctx.load_strategy,
            job_class_name = %$ctx.job_class_name,
            input_rows_processed = $ctx.input_rows_processed,
            input_name = %$ctx.input_name,
            batch = %$ctx.batch_attrs,
            "{}",
            $message
        )
    };
}

/// Structured attribute set attached to every log emission during a run.
///
/// Recomputed at each emission point (reader progress changes as the run
/// advances) and scoped to the single event it is attached to; nothing is
/// stored on the shared subscriber.
#[derive(Debug, Clone)]
pub struct RunLogContext {
    pub job_name: String,
    pub feed_name: String,
    pub load_strategy: String,
    pub job_class_name: String,
    pub input_rows_processed: Option<u64>,
    pub input_name: String,
    batch_attrs: String,
}

impl RunLogContext {
    pub fn new(
        job_name: impl Into<String>,
        feed_name: impl Into<String>,
        load_strategy: impl Into<String>,
        job_class_name: impl Into<String>,
        input_rows_processed: Option<u64>,
        input_name: Option<String>,
        batch: &Batch,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            feed_name: feed_name.into(),
            load_strategy: load_strategy.into(),
            job_class_name: job_class_name.into(),
            input_rows_processed,
            input_name: input_name.unwrap_or_else(|| NO_INPUT_NAME.to_string()),
            batch_attrs: batch_attributes(batch),
        }
    }

    pub fn info(&self, message: &str) {
        emit_run_event!(info, self, message);
    }

    pub fn debug(&self, message: &str) {
        emit_run_event!(debug, self, message);
    }

    pub fn warn(&self, message: &str) {
        emit_run_event!(warn, self, message);
    }

    pub fn error(&self, message: &str) {
        emit_run_event!(error, self, message);
    }
}

/// Renders the batch as a JSON object whose keys carry [`BATCH_KEY_PREFIX`].
fn batch_attributes(batch: &Batch) -> String {
    let attrs: Map<String, Value> = batch
        .iter()
        .map(|(k, v)| (format!("{BATCH_KEY_PREFIX}{k}"), v.clone()))
        .collect();
    Value::Object(attrs).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_attributes_are_prefixed() {
        let batch = Batch::new().with("day", "2015-03-31").with("month", 3);
        let attrs = batch_attributes(&batch);
        assert_eq!(attrs, r#"{"batch_day":"2015-03-31","batch_month":3}"#);
    }

    #[test]
    fn test_missing_reader_uses_sentinel_name() {
        let ctx = RunLogContext::new(
            "test_feed",
            "test_feed",
            "unknown",
            "TestJob",
            None,
            None,
            &Batch::new(),
        );
        assert_eq!(ctx.input_name, NO_INPUT_NAME);
        assert!(ctx.input_rows_processed.is_none());
    }
}
