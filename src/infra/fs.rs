//! # File System Operations Module / 文件系统操作模块
//!
//! Caselist reading and the append-only case log.
//!
//! 读取用例列表和只追加的用例日志。

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Reads a caselist file: one case name per line, surrounding whitespace
/// trimmed, blank lines skipped.
///
/// # Arguments
/// * `path` - Path to the caselist file
///
/// # Returns
/// The case names in file order
pub fn read_caselist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read caselist: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Removes an existing log file so a fresh run starts with a fresh log.
pub fn reset_log(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove old log file: {}", path.display()))?;
    }
    Ok(())
}

/// The append-only case log. Every raw line read from the executable is
/// appended immediately, one flush per line, so the log is complete up to
/// the last line seen even if the driver dies next.
pub struct CaseLog {
    file: File,
}

impl CaseLog {
    /// Opens the log at `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        Ok(Self { file })
    }

    /// Appends one line (newline added) and flushes it.
    pub fn append_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{line}").context("Failed to append to the log file")?;
        self.file.flush().context("Failed to flush the log file")?;
        Ok(())
    }
}
