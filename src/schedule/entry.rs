//! Crontab line parsing
//!
//! Turns one raw crontab line (`m h dom mon dow command...` or
//! `@macro command...`) into a [`ScheduleEntry`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ScheduleError, ScheduleResult};
use super::field::{FieldKind, PatternExpression};

/// Five-field cron pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchedulePattern {
    pub minute: PatternExpression,
    pub hour: PatternExpression,
    pub day_of_month: PatternExpression,
    pub month: PatternExpression,
    pub day_of_week: PatternExpression,
}

impl SchedulePattern {
    /// Parse five field tokens in crontab order
    pub fn from_fields(fields: &[&str]) -> ScheduleResult<Self> {
        if fields.len() != 5 {
            return Err(ScheduleError::malformed_line(
                fields.join(" "),
                format!("expected 5 time fields, found {}", fields.len()),
            ));
        }

        Ok(Self {
            minute: PatternExpression::parse(FieldKind::Minute, fields[0])?,
            hour: PatternExpression::parse(FieldKind::Hour, fields[1])?,
            day_of_month: PatternExpression::parse(FieldKind::DayOfMonth, fields[2])?,
            month: PatternExpression::parse(FieldKind::Month, fields[3])?,
            day_of_week: PatternExpression::parse(FieldKind::DayOfWeek, fields[4])?,
        })
    }

    /// Expression for a given field
    pub fn field(&self, kind: FieldKind) -> &PatternExpression {
        match kind {
            FieldKind::Minute => &self.minute,
            FieldKind::Hour => &self.hour,
            FieldKind::DayOfMonth => &self.day_of_month,
            FieldKind::Month => &self.month,
            FieldKind::DayOfWeek => &self.day_of_week,
        }
    }

    /// Five-field equivalent of a `@macro`
    fn from_macro(name: &str) -> ScheduleResult<Self> {
        let fields = match name {
            "@yearly" | "@annually" => "0 0 1 1 *",
            "@monthly" => "0 0 1 * *",
            "@weekly" => "0 0 * * 0",
            "@daily" | "@midnight" => "0 0 * * *",
            "@hourly" => "0 * * * *",
            "@reboot" => {
                return Err(ScheduleError::malformed_line(
                    name,
                    "@reboot has no calendar occurrences",
                ))
            }
            other => {
                return Err(ScheduleError::malformed_line(
                    other,
                    "unknown schedule macro",
                ))
            }
        };
        fields.parse()
    }
}

impl FromStr for SchedulePattern {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        Self::from_fields(&fields)
    }
}

impl fmt::Display for SchedulePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

/// One scheduled task from a user's crontab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// User whose crontab holds the entry
    pub owner: String,

    /// Parsed timing pattern
    pub pattern: SchedulePattern,

    /// Timing fields as written (single-space separated, macros kept)
    pub pattern_text: String,

    /// Command text, tokens rejoined with single spaces
    pub command: String,
}

impl ScheduleEntry {
    /// Parse a raw crontab line owned by `owner`
    pub fn parse(owner: &str, line: &str) -> ScheduleResult<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let (pattern, pattern_len) = match tokens.first() {
            Some(first) if first.starts_with('@') => {
                (SchedulePattern::from_macro(&first.to_ascii_lowercase())?, 1)
            }
            _ => {
                if tokens.len() < 6 {
                    return Err(ScheduleError::malformed_line(
                        line.trim(),
                        format!("expected at least 6 fields, found {}", tokens.len()),
                    ));
                }
                (SchedulePattern::from_fields(&tokens[..5])?, 5)
            }
        };

        if tokens.len() <= pattern_len {
            return Err(ScheduleError::malformed_line(line.trim(), "missing command"));
        }

        Ok(Self {
            owner: owner.to_string(),
            pattern,
            pattern_text: tokens[..pattern_len].join(" "),
            command: tokens[pattern_len..].join(" "),
        })
    }
}
