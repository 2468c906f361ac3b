//! Execution log backed by a syslog file

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::{SourceError, SourceResult};
use super::ExecutionLog;

/// Streams the syslog file on every scrape, keeping only tagged lines
#[derive(Debug, Clone)]
pub struct SyslogFile {
    path: PathBuf,
}

impl SyslogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, e: std::io::Error) -> SourceError {
        SourceError::LogUnavailable {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

impl ExecutionLog for SyslogFile {
    fn read_log(&self, tag: &str) -> SourceResult<Vec<String>> {
        let file = File::open(&self.path).map_err(|e| self.unavailable(e))?;
        let mut reader = BufReader::new(file);

        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| self.unavailable(e))?;
            if read == 0 {
                break;
            }

            // Rotated or corrupted logs may carry invalid UTF-8
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.contains(tag) {
                lines.push(line.to_string());
            }
        }

        Ok(lines)
    }
}
