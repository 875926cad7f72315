//! # Batch
//!
//! A batch names the partition of data a job run is scoped to, e.g.
//! `{year, month, day}` for a daily feed. Batches are persisted on the run
//! record in serialized form and identified by a deterministic string key
//! derived from their values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Mapping from partition-key name to value.
///
/// Keys are held sorted so that serialization and identity derivation are
/// independent of insertion order. Two batches with the same key/value
/// content are the same batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    entries: BTreeMap<String, Value>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, for `Batch::new().with("day", "2015-03-31")`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Entries in key-sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the deterministic identity string for this batch.
    ///
    /// Values are taken in key-sorted order, stringified (null contributes an
    /// empty token), lowercased, stripped of every character outside
    /// `[a-z0-9]`, and joined with underscores. The result is stable across
    /// insertion orders, which makes it the natural idempotency key for
    /// "has this batch already been run". An empty batch yields an empty
    /// string, meaning the run is not scoped to any partition.
    pub fn id(&self) -> String {
        let tokens: Vec<String> = self.entries.values().map(clean_token).collect();
        tokens.join("_")
    }

    /// Canonical serialized form persisted on the run record. Key order is
    /// sorted, so equal batches serialize identically.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Parses a batch back out of its persisted serialized form.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: BTreeMap<String, Value> = serde_json::from_str(raw)?;
        Ok(Self { entries })
    }
}

impl FromIterator<(String, Value)> for Batch {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Stringify one batch value and reduce it to its identity token.
fn clean_token(value: &Value) -> String {
    let raw = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    raw.to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
