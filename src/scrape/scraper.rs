//! Scrape orchestration
//!
//! One pass walks every configured user, parses each crontab line, computes
//! its neighbouring fire times and correlates the previous one against the
//! execution log. Failures are contained at the smallest scope possible:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | malformed line | entry skipped, `parse_errors` + 1 |
//! | no occurrence | entry skipped, `occurrence_errors` + 1 |
//! | user not found / access denied | user skipped, `user_errors` + 1 |
//! | log unavailable | every outcome is `Failure` |

use chrono::{Local, NaiveDateTime};
use std::sync::Arc;
use std::time::Instant;

use super::snapshot::{MetricRecord, ScrapeErrors, Snapshot};
use crate::config::Config;
use crate::correlate::Correlator;
use crate::error::ExporterErrorTrait;
use crate::schedule::{OccurrenceInfo, ScheduleEntry, ScheduleError};
use crate::source::{CrontabSource, ExecutionLog, ScheduleSource, SyslogFile};

/// Drives one complete scrape over all configured users
#[derive(Clone)]
pub struct Scraper {
    users: Vec<String>,
    schedules: Arc<dyn ScheduleSource>,
    log: Arc<dyn ExecutionLog>,
}

impl Scraper {
    pub fn new(
        users: Vec<String>,
        schedules: Arc<dyn ScheduleSource>,
        log: Arc<dyn ExecutionLog>,
    ) -> Self {
        Self {
            users,
            schedules,
            log,
        }
    }

    /// Scraper over the system crontab and syslog file
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.cron.users.clone(),
            Arc::new(CrontabSource::from_config(&config.cron)),
            Arc::new(SyslogFile::new(config.cron.syslog_file.clone())),
        )
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Scrape against the local wall clock
    pub fn scrape(&self) -> Snapshot {
        self.scrape_at(Local::now().naive_local())
    }

    /// Scrape against an explicit reference instant
    pub fn scrape_at(&self, now: NaiveDateTime) -> Snapshot {
        let started = Instant::now();
        let correlator = Correlator::from_log(self.log.as_ref());

        let mut total_count = 0;
        let mut records = Vec::new();
        let mut errors = ScrapeErrors::default();

        for user in &self.users {
            let lines = match self.schedules.list_schedules(user) {
                Ok(lines) => lines,
                Err(e) => {
                    tracing::warn!(
                        user = %user,
                        error = %e,
                        recoverable = e.is_recoverable(),
                        "Skipping user"
                    );
                    errors.user_errors += 1;
                    continue;
                }
            };

            for line in &lines {
                let entry = match ScheduleEntry::parse(user, line) {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!(user = %user, line = %line, error = %e, "Skipping malformed schedule");
                        errors.parse_errors += 1;
                        continue;
                    }
                };
                total_count += 1;

                match evaluate(&entry, now, &correlator) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(user = %user, pattern = %entry.pattern_text, error = %e, "Skipping schedule");
                        errors.occurrence_errors += 1;
                    }
                }
            }
        }

        let duration = started.elapsed();
        tracing::debug!(
            users = self.users.len(),
            total = total_count,
            records = records.len(),
            skipped = errors.total(),
            log_available = correlator.is_available(),
            duration_ms = duration.as_millis() as u64,
            "Scrape finished"
        );

        Snapshot {
            generation: 0,
            total_count,
            records,
            errors,
            log_available: correlator.is_available(),
            generated_at: Some(Local::now()),
            duration,
        }
    }
}

fn evaluate(
    entry: &ScheduleEntry,
    now: NaiveDateTime,
    correlator: &Correlator,
) -> Result<MetricRecord, ScheduleError> {
    let info = OccurrenceInfo::calculate(&entry.pattern, now)?;
    let outcome = correlator.outcome(&entry.command, info.previous_run);

    Ok(MetricRecord {
        user: entry.owner.clone(),
        pattern: entry.pattern_text.clone(),
        human_readable: info.human_readable,
        command: entry.command.clone(),
        next_run: info.next_run,
        previous_run: info.previous_run,
        outcome,
    })
}
