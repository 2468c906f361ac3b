//! Scrape pipeline and snapshot storage
//!
//! ```text
//! users ──▶ ScheduleSource ──▶ ScheduleEntry::parse ──▶ OccurrenceInfo
//!                                                          │
//!                                  ExecutionLog ──▶ Correlator
//!                                                          │
//!                                                          ▼
//!                                   Snapshot ──▶ SnapshotStore::replace
//! ```

pub mod scraper;
pub mod snapshot;

pub use scraper::Scraper;
pub use snapshot::{MetricRecord, ScrapeErrors, Snapshot, SnapshotStore, LABEL_TIME_FORMAT};
