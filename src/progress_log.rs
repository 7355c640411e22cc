use crate::error::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Append-only record of which pipeline stages have completed.
///
/// The file is reopened for every message; there is no rotation and no
/// locking, so only one run should write to a given path at a time.
#[derive(Debug, Clone)]
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `"<timestamp> : <message>"` as a new line.
    pub fn log(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_line(&Local::now().format(TIMESTAMP_FORMAT).to_string(), message))?;
        info!(progress = %message);
        Ok(())
    }
}

fn format_line(timestamp: &str, message: &str) -> String {
    format!("{} : {}", timestamp, message)
}
