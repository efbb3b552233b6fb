//! Audit logger for the append-only audit log
//!
//! `AuditSink` is the seam the file transform logs through. `FileAuditLog`
//! appends plain text lines to one file per process start; the in-memory and
//! null sinks keep tests free of file-system logging.

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Timelike};

use crate::error::{FilecryptError, FilecryptResult};

use super::entry::AuditEntry;

/// Receives audit messages
///
/// Recording never fails from the caller's point of view.
pub trait AuditSink {
    /// Record one message
    fn record(&self, message: &str);
}

/// Appends audit lines to `<log_dir>/<H>_<M>_<S>_<month>_<day>_<year>.log`
pub struct FileAuditLog {
    /// Directory holding the log files
    log_dir: PathBuf,
    /// Path to this process's log file
    log_path: PathBuf,
}

impl FileAuditLog {
    /// Create a logger whose file name is stamped with the current local time
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let log_dir = log_dir.into();
        let log_path = log_dir.join(log_file_name(&Local::now()));
        Self { log_dir, log_path }
    }

    /// Append a message, reporting failures to the caller
    ///
    /// The log directory is created if missing before every append; the file
    /// is opened fresh and the line written with a single call.
    pub fn try_record(&self, message: &str) -> FilecryptResult<()> {
        if !self.log_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.log_dir)
                .map_err(|e| FilecryptError::Io(format!("Failed to create log directory: {}", e)))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| FilecryptError::Io(format!("Failed to open audit log: {}", e)))?;

        let line = format!("{}\n", AuditEntry::new(message).format_line());
        file.write_all(line.as_bytes())
            .map_err(|e| FilecryptError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| FilecryptError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Get the path to the audit log file
    pub fn path(&self) -> &Path {
        &self.log_path
    }
}

impl AuditSink for FileAuditLog {
    fn record(&self, message: &str) {
        if let Err(e) = self.try_record(message) {
            eprintln!(
                "Warning: could not write audit log {}: {}",
                self.path().display(),
                e
            );
        }
    }
}

/// Keeps messages in memory
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    messages: RefCell<Vec<String>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded messages
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Discards every message
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditLog;

impl AuditSink for NullAuditLog {
    fn record(&self, _message: &str) {}
}

/// Log file name for a process started at `now`; fields are not zero-padded
pub fn log_file_name<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "{}_{}_{}_{}_{}_{}.log",
        now.hour(),
        now.minute(),
        now.second(),
        now.month(),
        now.day(),
        now.year()
    )
}
