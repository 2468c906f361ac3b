//! Natural-language rendering of cron patterns
//!
//! The text depends only on the pattern, never on the evaluation instant.

use super::entry::SchedulePattern;
use super::field::{FieldKind, PatternExpression};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Describe a pattern, e.g. `every day at 04:00`
pub fn describe(pattern: &SchedulePattern) -> String {
    let date = describe_date(pattern);

    if let (Some(minute), Some(hour)) = (pattern.minute.as_single(), pattern.hour.as_single()) {
        let date = date.unwrap_or_else(|| "every day".to_string());
        return format!("{} at {:02}:{:02}", date, hour, minute);
    }

    let time = describe_time(&pattern.minute, &pattern.hour);
    match date {
        Some(date) => format!("{} {}", time, date),
        None => time,
    }
}

fn is_every(expr: &PatternExpression) -> bool {
    matches!(expr, PatternExpression::Wildcard)
}

fn describe_time(minute: &PatternExpression, hour: &PatternExpression) -> String {
    let minute_text = match minute {
        PatternExpression::Wildcard => "every minute".to_string(),
        PatternExpression::Step {
            range: None,
            interval: 1,
        } => "every minute".to_string(),
        PatternExpression::Step {
            range: None,
            interval,
        } => format!("every {} minutes", interval),
        PatternExpression::Step {
            range: Some((lo, hi)),
            interval,
        } => format!("every {} minutes from minute {} through {}", interval, lo, hi),
        PatternExpression::Range(lo, hi) => format!("every minute from {} through {}", lo, hi),
        PatternExpression::Single(m) => format!("at minute {}", m),
        PatternExpression::List(_) => format!(
            "at minutes {}",
            join_words(&minute.values(FieldKind::Minute), |m| m.to_string())
        ),
    };

    let minute_spans_hour = matches!(
        minute,
        PatternExpression::Wildcard | PatternExpression::Step { range: None, .. }
    );

    let hour_text = match hour {
        PatternExpression::Wildcard if minute_spans_hour => return minute_text,
        PatternExpression::Wildcard => "past every hour".to_string(),
        PatternExpression::Single(h) if minute_spans_hour => {
            format!("between {:02}:00 and {:02}:59", h, h)
        }
        PatternExpression::Single(h) => format!("past {:02}:00", h),
        PatternExpression::Range(lo, hi) => format!("between {:02}:00 and {:02}:59", lo, hi),
        PatternExpression::Step {
            range: None,
            interval,
        } => format!("past every {} hours", interval),
        PatternExpression::Step {
            range: Some((lo, hi)),
            interval,
        } => format!(
            "past every {} hours from {:02}:00 through {:02}:00",
            interval, lo, hi
        ),
        PatternExpression::List(_) => format!(
            "past {}",
            join_words(&hour.values(FieldKind::Hour), |h| format!("{:02}:00", h))
        ),
    };

    format!("{} {}", minute_text, hour_text)
}

fn describe_date(pattern: &SchedulePattern) -> Option<String> {
    let dom = (!is_every(&pattern.day_of_month)).then(|| {
        match &pattern.day_of_month {
            PatternExpression::Step {
                range: None,
                interval,
            } => format!("every {} days", interval),
            expr => format!(
                "on the {}",
                value_phrase(expr, FieldKind::DayOfMonth, ordinal)
            ),
        }
    });

    let dow = (!is_every(&pattern.day_of_week)).then(|| {
        format!(
            "on {}",
            value_phrase(&pattern.day_of_week, FieldKind::DayOfWeek, |d| {
                WEEKDAYS[d as usize % 7].to_string()
            })
        )
    });

    let days = match (dom, dow) {
        (Some(dom), Some(dow))
            if pattern.day_of_month.is_restricted() && pattern.day_of_week.is_restricted() =>
        {
            Some(format!("{} or {}", dom, dow))
        }
        (Some(dom), Some(dow)) => Some(format!("{} {}", dom, dow)),
        (dom, dow) => dom.or(dow),
    };

    let month = (!is_every(&pattern.month)).then(|| match &pattern.month {
        PatternExpression::Range(lo, hi) => format!(
            "from {} through {}",
            MONTHS[*lo as usize - 1],
            MONTHS[*hi as usize - 1]
        ),
        expr => format!(
            "in {}",
            value_phrase(expr, FieldKind::Month, |m| MONTHS[m as usize - 1].to_string())
        ),
    });

    match (days, month) {
        (Some(days), Some(month)) => Some(format!("{} {}", days, month)),
        (None, Some(month)) => Some(format!("every day {}", month)),
        (days, None) => days,
    }
}

fn value_phrase(expr: &PatternExpression, kind: FieldKind, name: impl Fn(u8) -> String) -> String {
    match expr {
        PatternExpression::Single(v) => name(*v),
        PatternExpression::Range(lo, hi) => format!("{} through {}", name(*lo), name(*hi)),
        other => join_words(&other.values(kind), name),
    }
}

fn join_words(values: &[u8], name: impl Fn(u8) -> String) -> String {
    let words: Vec<String> = values.iter().map(|v| name(*v)).collect();
    match words.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
