//! Common test utilities

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use cron_exporter::scrape::Scraper;
use cron_exporter::source::{ExecutionLog, ScheduleSource};

/// Local wall-clock instant at minute resolution
#[allow(dead_code)]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Saturday 2026-10-17 12:00
#[allow(dead_code)]
pub fn saturday_noon() -> NaiveDateTime {
    at(2026, 10, 17, 12, 0)
}

/// Scraper over the given collaborators
#[allow(dead_code)]
pub fn scraper(
    users: &[&str],
    schedules: impl ScheduleSource + 'static,
    log: impl ExecutionLog + 'static,
) -> Scraper {
    Scraper::new(
        users.iter().map(|u| u.to_string()).collect(),
        Arc::new(schedules),
        Arc::new(log),
    )
}
