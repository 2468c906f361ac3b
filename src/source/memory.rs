//! In-memory sources for embedding and tests

use std::collections::{HashMap, HashSet};

use super::error::{SourceError, SourceResult};
use super::{ExecutionLog, ScheduleSource};

/// Fixed crontab contents keyed by user
#[derive(Debug, Clone, Default)]
pub struct MemorySchedules {
    crontabs: HashMap<String, Vec<String>>,
    denied: HashSet<String>,
}

impl MemorySchedules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with the given raw crontab lines
    pub fn with_user<I, S>(mut self, user: &str, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.crontabs
            .insert(user.to_string(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Mark a user whose crontab cannot be read
    pub fn with_denied_user(mut self, user: &str) -> Self {
        self.denied.insert(user.to_string());
        self
    }
}

impl ScheduleSource for MemorySchedules {
    fn list_schedules(&self, user: &str) -> SourceResult<Vec<String>> {
        if self.denied.contains(user) {
            return Err(SourceError::AccessDenied {
                user: user.to_string(),
                reason: "permission denied".to_string(),
            });
        }
        self.crontabs
            .get(user)
            .cloned()
            .ok_or_else(|| SourceError::UserNotFound {
                user: user.to_string(),
            })
    }
}

/// Fixed execution log; `None` behaves like an unreadable log
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    lines: Option<Vec<String>>,
}

impl MemoryLog {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Some(lines.into_iter().map(Into::into).collect()),
        }
    }

    pub fn unavailable() -> Self {
        Self { lines: None }
    }
}

impl ExecutionLog for MemoryLog {
    fn read_log(&self, tag: &str) -> SourceResult<Vec<String>> {
        let lines = self.lines.as_ref().ok_or_else(|| SourceError::LogUnavailable {
            path: "<memory>".to_string(),
            reason: "log not configured".to_string(),
        })?;
        Ok(lines.iter().filter(|l| l.contains(tag)).cloned().collect())
    }
}
