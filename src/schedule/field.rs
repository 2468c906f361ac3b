//! Cron field grammar
//!
//! Each of the five time fields of a crontab line is parsed into a
//! [`PatternExpression`]. Expressions keep the shape of the source text so
//! they can be rendered back, and are resolved to a bitset of matching values
//! when a schedule is compiled for occurrence search.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{ScheduleError, ScheduleResult};

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

// ============================================================================
// Field Kind
// ============================================================================

/// Position of a field within the five-field cron pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl FieldKind {
    /// Field name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::DayOfMonth => "day-of-month",
            Self::Month => "month",
            Self::DayOfWeek => "day-of-week",
        }
    }

    /// Smallest valid value
    pub fn min(&self) -> u8 {
        match self {
            Self::DayOfMonth | Self::Month => 1,
            _ => 0,
        }
    }

    /// Largest valid value after normalization
    pub fn max(&self) -> u8 {
        match self {
            Self::Minute => 59,
            Self::Hour => 23,
            Self::DayOfMonth => 31,
            Self::Month => 12,
            Self::DayOfWeek => 6,
        }
    }

    /// Largest value accepted in source text (weekday 7 is Sunday)
    fn parse_max(&self) -> u8 {
        match self {
            Self::DayOfWeek => 7,
            other => other.max(),
        }
    }

    /// Bitset with every valid value set
    pub fn full_set(&self) -> u64 {
        (self.min()..=self.max()).fold(0, |bits, v| bits | (1u64 << v))
    }

    fn normalize(&self, value: u8) -> u8 {
        if *self == Self::DayOfWeek && value == 7 {
            0
        } else {
            value
        }
    }

    fn named_value(&self, token: &str) -> Option<u8> {
        let upper = token.to_ascii_uppercase();
        match self {
            Self::Month => MONTH_NAMES
                .iter()
                .position(|n| *n == upper)
                .map(|i| i as u8 + 1),
            Self::DayOfWeek => WEEKDAY_NAMES
                .iter()
                .position(|n| *n == upper)
                .map(|i| i as u8),
            _ => None,
        }
    }

    fn parse_value(&self, token: &str, source: &str) -> ScheduleResult<u8> {
        let value = match token.parse::<u8>() {
            Ok(v) => v,
            Err(_) => self.named_value(token).ok_or_else(|| {
                ScheduleError::malformed_field(
                    *self,
                    source,
                    format!("'{}' is not a number", token),
                )
            })?,
        };

        if value < self.min() || value > self.parse_max() {
            return Err(ScheduleError::malformed_field(
                *self,
                source,
                format!(
                    "value {} out of range {}-{}",
                    value,
                    self.min(),
                    self.parse_max()
                ),
            ));
        }
        Ok(value)
    }

    fn parse_range(&self, token: &str, source: &str) -> ScheduleResult<(u8, u8)> {
        let (lo, hi) = token.split_once('-').ok_or_else(|| {
            ScheduleError::malformed_field(*self, source, format!("'{}' is not a range", token))
        })?;
        let lo = self.parse_value(lo, source)?;
        let hi = self.parse_value(hi, source)?;
        if lo > hi {
            return Err(ScheduleError::malformed_field(
                *self,
                source,
                format!("range start {} is after end {}", lo, hi),
            ));
        }
        Ok((lo, hi))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Pattern Expression
// ============================================================================

/// Parsed form of one cron field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternExpression {
    /// `*`
    Wildcard,

    /// `5`
    Single(u8),

    /// `1-5`
    Range(u8, u8),

    /// `*/15` (`range: None`), `0-30/10` or `5/10`
    Step {
        range: Option<(u8, u8)>,
        interval: u8,
    },

    /// `1,5,10-12`; items are never lists themselves
    List(Vec<PatternExpression>),
}

impl PatternExpression {
    /// Parse one field token
    pub fn parse(kind: FieldKind, token: &str) -> ScheduleResult<Self> {
        if token.is_empty() {
            return Err(ScheduleError::malformed_field(kind, token, "empty field"));
        }

        if !token.contains(',') {
            return Self::parse_atom(kind, token, token);
        }

        let items = token
            .split(',')
            .map(|part| {
                if part.is_empty() {
                    Err(ScheduleError::malformed_field(
                        kind,
                        token,
                        "empty list element",
                    ))
                } else {
                    Self::parse_atom(kind, part, token)
                }
            })
            .collect::<ScheduleResult<Vec<_>>>()?;

        Ok(Self::List(items))
    }

    fn parse_atom(kind: FieldKind, part: &str, source: &str) -> ScheduleResult<Self> {
        if let Some((base, interval)) = part.split_once('/') {
            let interval = interval.parse::<u8>().map_err(|_| {
                ScheduleError::malformed_field(
                    kind,
                    source,
                    format!("step '{}' is not a number", interval),
                )
            })?;
            let span = kind.parse_max() - kind.min() + 1;
            if interval == 0 || interval > span {
                return Err(ScheduleError::malformed_field(
                    kind,
                    source,
                    format!("step {} out of range 1-{}", interval, span),
                ));
            }

            let range = if base == "*" {
                None
            } else if base.contains('-') {
                Some(kind.parse_range(base, source)?)
            } else {
                // `a/n` runs to the top of the parse domain, so weekday 7 stays reachable
                Some((kind.parse_value(base, source)?, kind.parse_max()))
            };
            return Ok(Self::Step { range, interval });
        }

        if part == "*" {
            Ok(Self::Wildcard)
        } else if part.contains('-') {
            let (lo, hi) = kind.parse_range(part, source)?;
            Ok(Self::Range(lo, hi))
        } else {
            Ok(Self::Single(kind.parse_value(part, source)?))
        }
    }

    /// Resolve to a bitset of matching (normalized) values
    pub fn resolve(&self, kind: FieldKind) -> u64 {
        let span = |lo: u8, hi: u8, step: usize| {
            (lo..=hi)
                .step_by(step)
                .fold(0u64, |bits, v| bits | (1u64 << kind.normalize(v)))
        };

        match self {
            Self::Wildcard => kind.full_set(),
            Self::Single(v) => 1u64 << kind.normalize(*v),
            Self::Range(lo, hi) => span(*lo, *hi, 1),
            Self::Step { range, interval } => {
                let (lo, hi) = range.unwrap_or((kind.min(), kind.max()));
                span(lo, hi, *interval as usize)
            }
            Self::List(items) => items.iter().fold(0, |bits, e| bits | e.resolve(kind)),
        }
    }

    /// Sorted list of matching values
    pub fn values(&self, kind: FieldKind) -> Vec<u8> {
        let bits = self.resolve(kind);
        (kind.min()..=kind.max())
            .filter(|v| bits & (1u64 << v) != 0)
            .collect()
    }

    /// Whether the field narrows the allowed values
    ///
    /// Follows the classic cron rule: a field whose text starts with `*`
    /// (including `*/n`) counts as unrestricted for the day-of-month /
    /// day-of-week combination.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Self::Wildcard | Self::Step { range: None, .. })
    }

    /// Single fixed value, if the expression is one
    pub fn as_single(&self) -> Option<u8> {
        match self {
            Self::Single(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for PatternExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Single(v) => write!(f, "{}", v),
            Self::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
            Self::Step {
                range: None,
                interval,
            } => write!(f, "*/{}", interval),
            Self::Step {
                range: Some((lo, hi)),
                interval,
            } => write!(f, "{}-{}/{}", lo, hi, interval),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}
