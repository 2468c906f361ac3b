//! Execution log correlation
//!
//! Decides whether a command ran at its expected fire time by looking for a
//! cron-tagged log line stamped with that minute and mentioning the command.
//! Matching is by substring, so surrounding text such as host names, PIDs or
//! the `(user) CMD (...)` wrapper is ignored.
//!
//! Two timestamp styles are recognised:
//!
//! | Style | Example |
//! |-------|---------|
//! | BSD syslog | `Oct  7 04:00:01 host CRON[812]: (root) CMD (/usr/bin/backup.sh)` |
//! | RFC 3339 | `2026-10-07T04:00:01.311+00:00 host CRON[812]: (root) CMD (...)` |
//!
//! A line that opens with an RFC 3339 date is matched on that stamp alone,
//! year included. Other lines may carry either stamp anywhere. BSD stamps carry no year: in a log that has not been
//! rotated for a year, a line from the same minute one year earlier still
//! counts as a successful run.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::source::ExecutionLog;

/// Marker identifying lines written by the cron daemon (`CRON[pid]`, `CROND[pid]`)
pub const SCHEDULER_TAG: &str = "CRON";

/// Result of correlating one expected run against the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionOutcome {
    Success,
    Failure,
}

impl ExecutionOutcome {
    /// Gauge value: 1 for success, 0 for failure
    pub fn as_gauge(&self) -> f64 {
        match self {
            Self::Success => 1.0,
            Self::Failure => 0.0,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failed"),
        }
    }
}

/// BSD syslog minute stamp, day space-padded: `Oct  7 04:00`
pub fn syslog_timestamp(t: NaiveDateTime) -> String {
    t.format("%b %e %H:%M").to_string()
}

/// RFC 3339 minute prefix: `2026-10-07T04:00`
pub fn rfc3339_timestamp(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M").to_string()
}

/// Cron-tagged log lines loaded once per scrape
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    lines: Vec<String>,
    available: bool,
}

impl Correlator {
    /// Build from raw log lines, keeping only scheduler-tagged ones
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines
                .into_iter()
                .filter(|line| line.contains(SCHEDULER_TAG))
                .collect(),
            available: true,
        }
    }

    /// Correlator for an unreadable log; every lookup fails
    pub fn unavailable() -> Self {
        Self {
            lines: Vec::new(),
            available: false,
        }
    }

    /// Read the log, degrading to [`Correlator::unavailable`] on error
    pub fn from_log(log: &dyn ExecutionLog) -> Self {
        match log.read_log(SCHEDULER_TAG) {
            Ok(lines) => {
                let correlator = Self::new(lines);
                tracing::debug!(lines = correlator.len(), "Loaded execution log");
                correlator
            }
            Err(e) => {
                tracing::warn!(error = %e, "Execution log unavailable, reporting all runs as failed");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Number of scheduler-tagged lines retained
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether `command` was logged as run during the minute `at`
    pub fn outcome(&self, command: &str, at: NaiveDateTime) -> ExecutionOutcome {
        let command = command.trim();
        if command.is_empty() {
            return ExecutionOutcome::Failure;
        }

        let bsd = format!("{}:", syslog_timestamp(at));
        let rfc = format!("{}:", rfc3339_timestamp(at));

        let found = self.lines.iter().any(|line| {
            let stamped = if starts_with_rfc3339_date(line) {
                line.starts_with(&rfc)
            } else {
                line.contains(&bsd) || line.contains(&rfc)
            };
            stamped && line.contains(command)
        });

        if found {
            ExecutionOutcome::Success
        } else {
            ExecutionOutcome::Failure
        }
    }
}

/// `YYYY-MM-DDT` at the start of the line
fn starts_with_rfc3339_date(line: &str) -> bool {
    let b = line.as_bytes();
    b.len() >= 11
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b'-'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b'-'
        && b[8..10].iter().all(u8::is_ascii_digit)
        && b[10] == b'T'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryLog;
    use chrono::NaiveDate;

    fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn log() -> Vec<String> {
        vec![
            "Oct 16 17:45:01 web1 CRON[4242]: (ops) CMD (/usr/bin/backup.sh)".to_string(),
            "Oct  7 04:00:01 web1 CRON[812]: (root) CMD (/usr/sbin/logrotate /etc/logrotate.conf)"
                .to_string(),
            "Oct 16 17:45:03 web1 backup[4243]: /usr/bin/backup.sh started".to_string(),
            "2026-10-17T03:30:00.412+00:00 web1 CROND[77]: (root) CMD (run-parts /etc/cron.hourly)"
                .to_string(),
        ]
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(syslog_timestamp(at(10, 7, 4, 0)), "Oct  7 04:00");
        assert_eq!(syslog_timestamp(at(10, 17, 23, 5)), "Oct 17 23:05");
        assert_eq!(rfc3339_timestamp(at(10, 7, 4, 0)), "2026-10-07T04:00");
    }

    #[test]
    fn test_success_on_matching_line() {
        let correlator = Correlator::new(log());
        assert_eq!(
            correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 45)),
            ExecutionOutcome::Success
        );
        assert_eq!(
            correlator.outcome("  /usr/sbin/logrotate /etc/logrotate.conf ", at(10, 7, 4, 0)),
            ExecutionOutcome::Success
        );
        assert_eq!(
            correlator.outcome("run-parts /etc/cron.hourly", at(10, 17, 3, 30)),
            ExecutionOutcome::Success
        );
    }

    #[test]
    fn test_failure_on_wrong_minute_or_command() {
        let correlator = Correlator::new(log());
        assert_eq!(
            correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 30)),
            ExecutionOutcome::Failure
        );
        assert_eq!(
            correlator.outcome("/usr/bin/other.sh", at(10, 16, 17, 45)),
            ExecutionOutcome::Failure
        );
        assert_eq!(correlator.outcome("", at(10, 16, 17, 45)), ExecutionOutcome::Failure);
    }

    #[test]
    fn test_untagged_lines_ignored() {
        let correlator = Correlator::new(vec![
            "Oct 16 17:45:03 web1 backup[4243]: /usr/bin/backup.sh started".to_string(),
        ]);
        assert!(correlator.is_empty());
        assert_eq!(
            correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 45)),
            ExecutionOutcome::Failure
        );
    }

    #[test]
    fn test_rfc3339_stamp_checks_year() {
        let correlator = Correlator::new(vec![
            "2025-10-17T03:30:00.412+00:00 web1 CROND[77]: (root) CMD (run-parts /etc/cron.hourly)"
                .to_string(),
        ]);
        assert_eq!(
            correlator.outcome("run-parts /etc/cron.hourly", at(10, 17, 3, 30)),
            ExecutionOutcome::Failure
        );
    }

    #[test]
    fn test_bsd_stamp_ignores_year() {
        // No year in the stamp: last year's line for the same minute still matches
        let correlator = Correlator::new(vec![
            "Oct 16 17:45:01 web1 CRON[4242]: (ops) CMD (/usr/bin/backup.sh)".to_string(),
        ]);
        let last_year = NaiveDate::from_ymd_opt(2025, 10, 16)
            .unwrap()
            .and_hms_opt(17, 45, 0)
            .unwrap();
        assert!(correlator.outcome("/usr/bin/backup.sh", last_year).is_success());
        assert!(correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 45)).is_success());
    }

    #[test]
    fn test_from_file_keeps_only_tagged_lines() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in log() {
            writeln!(file, "{}", line).unwrap();
        }

        let correlator = Correlator::from_log(&crate::source::SyslogFile::new(file.path()));
        assert!(correlator.is_available());
        assert_eq!(correlator.len(), 3);
        assert_eq!(
            correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 45)),
            ExecutionOutcome::Success
        );
    }

    #[test]
    fn test_unavailable_log_fails_everything() {
        let correlator = Correlator::from_log(&MemoryLog::unavailable());
        assert!(!correlator.is_available());
        assert_eq!(
            correlator.outcome("/usr/bin/backup.sh", at(10, 16, 17, 45)),
            ExecutionOutcome::Failure
        );
    }

    #[test]
    fn test_outcome_gauge() {
        assert_eq!(ExecutionOutcome::Success.as_gauge(), 1.0);
        assert_eq!(ExecutionOutcome::Failure.as_gauge(), 0.0);
        assert_eq!(ExecutionOutcome::Failure.to_string(), "failed");
    }
}
