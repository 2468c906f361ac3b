//! Error types for the schedule module

use thiserror::Error;

use super::field::FieldKind;

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Schedule parsing and evaluation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A raw crontab line or one of its fields could not be parsed
    #[error("Malformed schedule{}: {reason}", field_suffix(.field, .token))]
    MalformedSchedule {
        field: Option<FieldKind>,
        token: Option<String>,
        reason: String,
    },

    /// The pattern never fires within the search window
    #[error("No occurrence of '{pattern}' found within {years} years")]
    NoOccurrenceFound { pattern: String, years: u32 },
}

fn field_suffix(field: &Option<FieldKind>, token: &Option<String>) -> String {
    match (field, token) {
        (Some(field), Some(token)) => format!(" in {} field '{}'", field.name(), token),
        (Some(field), None) => format!(" in {} field", field.name()),
        (None, Some(token)) => format!(" '{}'", token),
        (None, None) => String::new(),
    }
}

impl ScheduleError {
    /// Create a line-level malformed schedule error
    pub fn malformed_line(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSchedule {
            field: None,
            token: Some(line.into()),
            reason: reason.into(),
        }
    }

    /// Create a field-level malformed schedule error
    pub fn malformed_field(
        field: FieldKind,
        token: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedSchedule {
            field: Some(field),
            token: Some(token.into()),
            reason: reason.into(),
        }
    }

    /// The field that failed to parse, if known
    pub fn field(&self) -> Option<FieldKind> {
        match self {
            Self::MalformedSchedule { field, .. } => *field,
            Self::NoOccurrenceFound { .. } => None,
        }
    }

    /// Check if this error is a parse failure (as opposed to an evaluation failure)
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedSchedule { .. })
    }
}
