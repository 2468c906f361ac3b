//! Crontab schedule parsing and evaluation
//!
//! # Overview
//!
//! A raw crontab line flows through three stages:
//!
//! ```text
//! "*/15 9-17 * * 1-5 /usr/bin/backup.sh"
//!        │
//!        ▼  ScheduleEntry::parse
//! ┌───────────────────────────────┐
//! │ ScheduleEntry                 │
//! │  pattern: SchedulePattern     │  five PatternExpressions
//! │  command: "/usr/bin/backup.sh"│
//! └──────────────┬────────────────┘
//!                ▼  OccurrenceInfo::calculate(pattern, now)
//! ┌───────────────────────────────┐
//! │ OccurrenceInfo                │
//! │  human_readable               │
//! │  next_run / previous_run      │
//! └───────────────────────────────┘
//! ```
//!
//! # Grammar
//!
//! | Form | Example | Meaning |
//! |------|---------|---------|
//! | wildcard | `*` | every value |
//! | single | `5`, `MON`, `JAN` | one value |
//! | range | `1-5` | inclusive range |
//! | step | `*/15`, `0-30/10`, `5/10` | every n-th value of a range |
//! | list | `1,15,20-25` | union of the above |
//! | macro | `@daily`, `@hourly`, ... | five-field shorthand |
//!
//! When both day-of-month and day-of-week are restricted (their text does not
//! start with `*`), a day matches if either field matches.

pub mod describe;
pub mod entry;
pub mod error;
pub mod field;
pub mod occurrence;

// Re-export main types
pub use describe::describe;
pub use entry::{ScheduleEntry, SchedulePattern};
pub use error::{ScheduleError, ScheduleResult};
pub use field::{FieldKind, PatternExpression};
pub use occurrence::{CompiledSchedule, OccurrenceInfo, SEARCH_YEARS};
