//! Metric snapshots and their store
//!
//! A [`Snapshot`] is the complete result of one scrape. The
//! [`SnapshotStore`] swaps whole snapshots behind an `Arc`, so readers hold
//! either the previous or the new snapshot and never a mix of both.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::correlate::ExecutionOutcome;

/// Format of the `nextrun` / `previousrun` labels
pub const LABEL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Status of one schedule entry, the unit exposed as `cron_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    pub user: String,
    pub pattern: String,
    pub human_readable: String,
    pub command: String,
    pub next_run: NaiveDateTime,
    pub previous_run: NaiveDateTime,
    pub outcome: ExecutionOutcome,
}

impl MetricRecord {
    pub fn next_run_label(&self) -> String {
        self.next_run.format(LABEL_TIME_FORMAT).to_string()
    }

    pub fn previous_run_label(&self) -> String {
        self.previous_run.format(LABEL_TIME_FORMAT).to_string()
    }
}

/// Entries and users skipped during a scrape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeErrors {
    /// Lines rejected as malformed
    pub parse_errors: usize,

    /// Parsed entries with no occurrence in the search window
    pub occurrence_errors: usize,

    /// Users whose crontab could not be listed
    pub user_errors: usize,
}

impl ScrapeErrors {
    pub fn total(&self) -> usize {
        self.parse_errors + self.occurrence_errors + self.user_errors
    }
}

/// Complete, immutable result of one scrape cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Monotonic id assigned by the store; 0 before the first scrape
    pub generation: u64,

    /// Number of successfully parsed schedule entries
    pub total_count: usize,

    /// One record per entry with a computable occurrence, in crontab order
    pub records: Vec<MetricRecord>,

    pub errors: ScrapeErrors,

    /// Whether the execution log could be read
    pub log_available: bool,

    pub generated_at: Option<DateTime<Local>>,

    pub duration: Duration,
}

impl Snapshot {
    /// Placeholder served before the first scrape completes
    pub fn empty() -> Self {
        Self {
            generation: 0,
            total_count: 0,
            records: Vec::new(),
            errors: ScrapeErrors::default(),
            log_available: false,
            generated_at: None,
            duration: Duration::ZERO,
        }
    }

    pub fn success_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Holder of the current snapshot
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Current snapshot
    pub fn read(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new snapshot, returning it with its assigned generation
    pub fn replace(&self, mut snapshot: Snapshot) -> Arc<Snapshot> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        snapshot.generation = current.generation + 1;
        let snapshot = Arc::new(snapshot);
        *current = snapshot.clone();
        snapshot
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(user: &str) -> MetricRecord {
        let t = NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(4, 0, 0)
            .unwrap();
        MetricRecord {
            user: user.to_string(),
            pattern: "0 4 * * *".to_string(),
            human_readable: "every day at 04:00".to_string(),
            command: "/bin/true".to_string(),
            next_run: t,
            previous_run: t,
            outcome: ExecutionOutcome::Success,
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SnapshotStore::new();
        let snapshot = store.read();
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.records.is_empty());
    }

    #[test]
    fn test_replace_assigns_generation() {
        let store = SnapshotStore::new();
        let first = store.replace(Snapshot {
            total_count: 1,
            records: vec![record("alice")],
            ..Snapshot::empty()
        });
        assert_eq!(first.generation, 1);

        let held = store.read();
        let second = store.replace(Snapshot::empty());
        assert_eq!(second.generation, 2);

        // A reader keeps the snapshot it obtained
        assert_eq!(held.records.len(), 1);
        assert!(store.read().records.is_empty());
    }

    #[test]
    fn test_record_labels() {
        let r = record("alice");
        assert_eq!(r.next_run_label(), "2026-10-17 04:00");
        assert_eq!(r.previous_run_label(), "2026-10-17 04:00");
    }

    #[test]
    fn test_error_totals() {
        let errors = ScrapeErrors {
            parse_errors: 2,
            occurrence_errors: 1,
            user_errors: 3,
        };
        assert_eq!(errors.total(), 6);
    }
}
