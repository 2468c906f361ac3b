//! Per-user crontab listing
//!
//! Runs `crontab -l -u <user>` (optionally through `sudo -n`) with an argument
//! vector, never through a shell, and falls back to reading the spool file
//! directly when the command is missing or refused.

use regex::Regex;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

use super::error::{SourceError, SourceResult};
use super::ScheduleSource;
use crate::config::CronConfig;

/// `NAME=value` environment lines inside a crontab
static ENV_ASSIGNMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\s*=").unwrap());

/// Keep only schedule lines: drop blanks, comments and environment assignments
pub fn filter_schedule_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .filter(|line| !ENV_ASSIGNMENT_REGEX.is_match(line))
        .map(str::to_string)
        .collect()
}

/// Crontab reader backed by the system `crontab` command and spool directory
#[derive(Debug, Clone)]
pub struct CrontabSource {
    command: String,
    use_sudo: bool,
    spool_dirs: Vec<PathBuf>,
}

impl CrontabSource {
    pub fn new(command: impl Into<String>, use_sudo: bool, spool_dirs: Vec<PathBuf>) -> Self {
        Self {
            command: command.into(),
            use_sudo,
            spool_dirs,
        }
    }

    /// Build from the `[cron]` configuration section
    pub fn from_config(config: &CronConfig) -> Self {
        Self::new(
            config.crontab_command.clone(),
            config.use_sudo,
            config.spool_dirs.clone(),
        )
    }

    fn build_command(&self, user: &str) -> Command {
        let mut cmd = if self.use_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg("-n").arg(&self.command);
            cmd
        } else {
            Command::new(&self.command)
        };
        cmd.args(["-l", "-u", user]);
        cmd
    }

    fn run_command(&self, user: &str) -> SourceResult<String> {
        let output = self
            .build_command(user)
            .output()
            .map_err(|e| SourceError::io("run crontab", e))?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if stderr.to_ascii_lowercase().contains("no crontab for") {
            Err(SourceError::UserNotFound {
                user: user.to_string(),
            })
        } else {
            Err(SourceError::AccessDenied {
                user: user.to_string(),
                reason: if stderr.is_empty() {
                    format!("crontab exited with {}", output.status)
                } else {
                    stderr
                },
            })
        }
    }

    fn read_spool(&self, user: &str) -> Option<SourceResult<String>> {
        for dir in &self.spool_dirs {
            let path = dir.join(user);
            match std::fs::read_to_string(&path) {
                Ok(content) => return Some(Ok(content)),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                    return Some(Err(SourceError::AccessDenied {
                        user: user.to_string(),
                        reason: format!("{}: {}", path.display(), e),
                    }))
                }
                Err(e) => return Some(Err(SourceError::io("read crontab spool", e))),
            }
        }
        None
    }
}

impl ScheduleSource for CrontabSource {
    fn list_schedules(&self, user: &str) -> SourceResult<Vec<String>> {
        if user.is_empty() || user.starts_with('-') || user.contains('/') {
            return Err(SourceError::AccessDenied {
                user: user.to_string(),
                reason: "invalid user name".to_string(),
            });
        }

        let content = match self.run_command(user) {
            Ok(content) => content,
            Err(err @ SourceError::UserNotFound { .. }) => return Err(err),
            Err(err) => {
                tracing::debug!(user = %user, error = %err, "crontab command failed, trying spool");
                match self.read_spool(user) {
                    Some(result) => result?,
                    None => return Err(err),
                }
            }
        };

        Ok(filter_schedule_lines(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_schedule_lines() {
        let content = "\
# m h dom mon dow command
SHELL=/bin/bash
MAILTO = ops@example.com

   0 4 * * * /usr/bin/backup.sh
*/5 * * * * /usr/bin/poll
@daily /usr/sbin/logrotate
  # indented comment
";
        let lines = filter_schedule_lines(content);
        assert_eq!(
            lines,
            vec![
                "0 4 * * * /usr/bin/backup.sh",
                "*/5 * * * * /usr/bin/poll",
                "@daily /usr/sbin/logrotate",
            ]
        );
    }

    #[test]
    fn test_garbage_lines_kept_for_parser() {
        let lines = filter_schedule_lines("0 4 * *\nnot a schedule\n");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_spool_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alice"), "0 1 * * * /bin/true\n").unwrap();

        let source = CrontabSource::new(
            "/nonexistent/crontab-binary",
            false,
            vec![dir.path().to_path_buf()],
        );
        let lines = source.list_schedules("alice").unwrap();
        assert_eq!(lines, vec!["0 1 * * * /bin/true"]);
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let source = CrontabSource::new(
            "/nonexistent/crontab-binary",
            false,
            vec![dir.path().to_path_buf()],
        );
        assert!(source.list_schedules("bob").is_err());
    }

    #[test]
    fn test_invalid_user_names() {
        let source = CrontabSource::new("crontab", false, vec![]);
        for user in ["", "-r", "../etc/passwd"] {
            assert!(matches!(
                source.list_schedules(user),
                Err(SourceError::AccessDenied { .. })
            ));
        }
    }

    #[test]
    fn test_sudo_command_line() {
        let source = CrontabSource::new("crontab", true, vec![]);
        let cmd = source.build_command("alice");
        assert_eq!(cmd.get_program(), "sudo");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-n", "crontab", "-l", "-u", "alice"]);
    }
}
