//! cron-exporter - Prometheus exporter for per-user cron jobs
//!
//! Reads the crontab of each configured user, computes when every entry last
//! fired and fires next, checks the system log for evidence that the last
//! run happened, and exposes the result as Prometheus gauges.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`schedule`] - Crontab grammar, occurrence search, human-readable text
//! - [`source`] - Crontab and execution log access
//! - [`correlate`] - Matching expected runs against the execution log
//! - [`scrape`] - Scrape orchestration and snapshot storage
//! - [`metrics`] - Prometheus exposition
//! - [`server`] - HTTP endpoints and the serialized scrape trigger
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use cron_exporter::config::Config;
//! use cron_exporter::scrape::Scraper;
//!
//! let config = Config::from_env();
//! let snapshot = Scraper::from_config(&config).scrape();
//! println!("{} crons, {} ok", snapshot.total_count, snapshot.success_count());
//! ```

pub mod config;
pub mod correlate;
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod scrape;
pub mod server;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::correlate::{Correlator, ExecutionOutcome};
    pub use crate::error::{Error, ErrorCategory, ExporterErrorTrait, Result};
    pub use crate::schedule::{OccurrenceInfo, ScheduleEntry, SchedulePattern};
    pub use crate::scrape::{MetricRecord, Scraper, Snapshot, SnapshotStore};
    pub use crate::server::ExporterServer;
    pub use crate::source::{ExecutionLog, ScheduleSource};
}

// Direct re-exports for convenience
pub use schedule::{ScheduleEntry, ScheduleError};
pub use scrape::{Scraper, Snapshot};
