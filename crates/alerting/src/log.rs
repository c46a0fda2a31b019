//! Alert history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Number of records the dashboard keeps on screen
pub const DEFAULT_CAPACITY: usize = 5;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// A human-readable alert. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    id: Uuid,
    message: String,
    severity: Severity,
    created_at: DateTime<Utc>,
}

impl AlertRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Bounded, newest-first alert history.
///
/// Records enter at the head; once the log holds more than `capacity`
/// records the oldest one is evicted from the tail. There is no way to
/// remove an individual record.
#[derive(Debug, Clone)]
pub struct AlertLog {
    records: VecDeque<AlertRecord>,
    capacity: usize,
}

impl AlertLog {
    /// Create a log holding the last five alerts
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a log with a custom bound (at least one record)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert a record at the head. Returns the evicted record, if any.
    pub fn append(&mut self, record: AlertRecord) -> Option<AlertRecord> {
        info!("[{}] {}", record.severity, record.message);
        self.records.push_front(record);

        if self.records.len() > self.capacity {
            let evicted = self.records.pop_back();
            if let Some(old) = &evicted {
                debug!("Evicted alert {} from history", old.id);
            }
            evicted
        } else {
            None
        }
    }

    /// Create and append a record in one step
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> Option<AlertRecord> {
        self.append(AlertRecord::new(severity, message))
    }

    /// All records, newest first
    pub fn all(&self) -> impl DoubleEndedIterator<Item = &AlertRecord> + ExactSizeIterator {
        self.records.iter()
    }

    /// Most recent record
    pub fn latest(&self) -> Option<&AlertRecord> {
        self.records.front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Owned snapshot, newest first
    pub fn snapshot(&self) -> Vec<AlertRecord> {
        self.records.iter().cloned().collect()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new()
    }
}
