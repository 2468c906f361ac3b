//! Next/previous occurrence search
//!
//! Patterns are compiled into per-field bitsets and searched minute by minute,
//! jumping a whole month, day or hour whenever the higher-order field rejects
//! the candidate. Search is bounded to [`SEARCH_YEARS`] in each direction.
//!
//! All instants are naive local wall-clock times at minute resolution, the
//! same clock cron itself evaluates patterns against.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use super::describe::describe;
use super::entry::SchedulePattern;
use super::error::{ScheduleError, ScheduleResult};
use super::field::FieldKind;

/// Search window in each direction
pub const SEARCH_YEARS: u32 = 4;

/// Derived timing information for one schedule at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceInfo {
    pub human_readable: String,
    pub next_run: NaiveDateTime,
    pub previous_run: NaiveDateTime,
}

impl OccurrenceInfo {
    /// Compute description and neighbouring fire times around `now`
    pub fn calculate(pattern: &SchedulePattern, now: NaiveDateTime) -> ScheduleResult<Self> {
        let compiled = CompiledSchedule::new(pattern);
        let not_found = || ScheduleError::NoOccurrenceFound {
            pattern: pattern.to_string(),
            years: SEARCH_YEARS,
        };

        Ok(Self {
            human_readable: describe(pattern),
            next_run: compiled.next_after(now).ok_or_else(not_found)?,
            previous_run: compiled.previous_before(now).ok_or_else(not_found)?,
        })
    }
}

/// Pattern resolved to bitsets for fast matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledSchedule {
    minutes: u64,
    hours: u64,
    days: u64,
    months: u64,
    weekdays: u64,
    days_or: bool,
}

impl CompiledSchedule {
    pub fn new(pattern: &SchedulePattern) -> Self {
        Self {
            minutes: pattern.minute.resolve(FieldKind::Minute),
            hours: pattern.hour.resolve(FieldKind::Hour),
            days: pattern.day_of_month.resolve(FieldKind::DayOfMonth),
            months: pattern.month.resolve(FieldKind::Month),
            weekdays: pattern.day_of_week.resolve(FieldKind::DayOfWeek),
            days_or: pattern.day_of_month.is_restricted() && pattern.day_of_week.is_restricted(),
        }
    }

    fn has(bits: u64, value: u32) -> bool {
        bits & (1u64 << value) != 0
    }

    fn month_matches(&self, date: NaiveDate) -> bool {
        Self::has(self.months, date.month())
    }

    /// Day-of-month and day-of-week combine with OR when both are restricted
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = Self::has(self.days, date.day());
        let dow = Self::has(self.weekdays, date.weekday().num_days_from_sunday());
        if self.days_or {
            dom || dow
        } else {
            dom && dow
        }
    }

    /// Whether the pattern fires at the given minute
    pub fn matches(&self, t: NaiveDateTime) -> bool {
        self.month_matches(t.date())
            && self.day_matches(t.date())
            && Self::has(self.hours, t.hour())
            && Self::has(self.minutes, t.minute())
    }

    /// Smallest matching minute strictly after `now`
    pub fn next_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let start = truncate_to_minute(now)?;
        let limit = start.checked_add_months(Months::new(SEARCH_YEARS * 12))?;
        let mut t = start + Duration::minutes(1);

        while t <= limit {
            let date = t.date();
            if !self.month_matches(date) {
                t = first_of_next_month(date)?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !self.day_matches(date) {
                t = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if !Self::has(self.hours, t.hour()) {
                t = date.and_hms_opt(t.hour(), 0, 0)? + Duration::hours(1);
                continue;
            }
            if !Self::has(self.minutes, t.minute()) {
                t += Duration::minutes(1);
                continue;
            }
            return Some(t);
        }
        None
    }

    /// Largest matching minute strictly before `now`
    pub fn previous_before(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let start = truncate_to_minute(now)?;
        let limit = start.checked_sub_months(Months::new(SEARCH_YEARS * 12))?;
        let mut t = start - Duration::minutes(1);

        while t >= limit {
            let date = t.date();
            if !self.month_matches(date) {
                t = date.with_day(1)?.and_hms_opt(0, 0, 0)? - Duration::minutes(1);
                continue;
            }
            if !self.day_matches(date) {
                t = date.and_hms_opt(0, 0, 0)? - Duration::minutes(1);
                continue;
            }
            if !Self::has(self.hours, t.hour()) {
                t = date.and_hms_opt(t.hour(), 0, 0)? - Duration::minutes(1);
                continue;
            }
            if !Self::has(self.minutes, t.minute()) {
                t -= Duration::minutes(1);
                continue;
            }
            return Some(t);
        }
        None
    }
}

fn truncate_to_minute(t: NaiveDateTime) -> Option<NaiveDateTime> {
    t.with_second(0)?.with_nanosecond(0)
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(1))
}
