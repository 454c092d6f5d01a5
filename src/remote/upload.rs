//! Upload candidates, shape validation and batch outcome

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::remote::driver::{BatchRowError, Bind};
use crate::storage::local::Record;

/// A caller-supplied row that has not been validated yet.
///
/// Deserializes from a JSON array (positional) or a JSON object (named).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadCandidate {
    Positional(Vec<String>),
    Named(BTreeMap<String, String>),
}

/// A validated row ready for the remote insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadItem {
    pub identifier: String,
    pub event_date: String,
    pub payload: String,
}

const IDENTIFIER_KEYS: [&str; 2] = ["identifier", "id"];
const EVENT_DATE_KEYS: [&str; 1] = ["event_date"];
const PAYLOAD_KEYS: [&str; 2] = ["payload", "data"];

impl UploadCandidate {
    /// The validated item, or `None` when the shape is wrong.
    #[must_use]
    pub fn to_item(&self) -> Option<UploadItem> {
        match self {
            Self::Positional(fields) => match fields.as_slice() {
                [identifier, event_date, payload] => Some(UploadItem {
                    identifier: identifier.clone(),
                    event_date: event_date.clone(),
                    payload: payload.clone(),
                }),
                _ => None,
            },
            Self::Named(map) => Some(UploadItem {
                identifier: lookup(map, &IDENTIFIER_KEYS)?,
                event_date: lookup(map, &EVENT_DATE_KEYS)?,
                payload: lookup(map, &PAYLOAD_KEYS)?,
            }),
        }
    }
}

fn lookup(map: &BTreeMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key)).cloned()
}

impl From<Record> for UploadCandidate {
    fn from(record: Record) -> Self {
        Self::Positional(vec![record.identifier, record.event_date, record.payload])
    }
}

impl From<&Record> for UploadCandidate {
    fn from(record: &Record) -> Self {
        Self::from(record.clone())
    }
}

impl UploadItem {
    /// Binds for the remote insert: identifier to MRLCODE, event date to
    /// CREATE_DATE, payload to the annotation column.
    #[must_use]
    pub fn binds(&self) -> Vec<Bind> {
        vec![
            Bind::new("mrlcode", &self.identifier),
            Bind::new("create_date", &self.event_date),
            Bind::new("uda1", &self.payload),
        ]
    }
}

/// Result of one upload attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    /// True when every valid row was inserted and committed.
    pub committed: bool,
    /// Committed rows, or after a rollback the rows that would have succeeded.
    pub rows_uploaded: usize,
    /// Candidates dropped for a malformed shape.
    pub skipped: usize,
    /// Per-row failures that forced the rollback.
    pub failures: Vec<BatchRowError>,
}

impl UploadOutcome {
    #[must_use]
    pub const fn nothing_to_do(skipped: usize) -> Self {
        Self {
            committed: true,
            rows_uploaded: 0,
            skipped,
            failures: Vec::new(),
        }
    }

    /// `(all_or_nothing, rows_uploaded)`.
    #[must_use]
    pub const fn summary(&self) -> (bool, usize) {
        (self.committed, self.rows_uploaded)
    }
}
