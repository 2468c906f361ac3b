//! Data sources for a scrape
//!
//! Two collaborators feed the scrape pipeline:
//!
//! - [`ScheduleSource`] lists the raw crontab lines of one user
//! - [`ExecutionLog`] returns the tagged lines of the log cron writes to
//!
//! Both perform blocking I/O and are called from inside the serialized scrape.

pub mod crontab;
pub mod error;
pub mod memory;
pub mod syslog;

pub use crontab::{filter_schedule_lines, CrontabSource};
pub use error::{SourceError, SourceResult};
pub use memory::{MemoryLog, MemorySchedules};
pub use syslog::SyslogFile;

/// Per-user crontab store
pub trait ScheduleSource: Send + Sync {
    /// Raw schedule lines for `user`, comments and environment lines removed
    fn list_schedules(&self, user: &str) -> SourceResult<Vec<String>>;
}

/// Log of executed cron commands
pub trait ExecutionLog: Send + Sync {
    /// Lines containing `tag`; other lines are dropped while reading
    fn read_log(&self, tag: &str) -> SourceResult<Vec<String>>;
}
