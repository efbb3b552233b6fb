//! Audit logging system for filecrypt
//!
//! Records the start and outcome of every encrypt/decrypt operation, and
//! usage errors, in an append-only plain text log.
//!
//! # Architecture
//!
//! - `AuditEntry`: one `<timestamp> - <message>` line, plus the message
//!   builders used by the file transform.
//! - `AuditSink`: the trait the core logs through. Implemented by
//!   `FileAuditLog` (one file per process start under the log directory),
//!   `MemoryAuditLog` and `NullAuditLog`.
//!
//! # Example
//!
//! ```rust,ignore
//! use filecrypt::audit::{AuditSink, FileAuditLog};
//!
//! let log = FileAuditLog::new("log");
//! log.record("Started encrypting file notes.txt");
//! ```

mod entry;
mod logger;

pub use entry::{AuditEntry, Operation};
pub use logger::{log_file_name, AuditSink, FileAuditLog, MemoryAuditLog, NullAuditLog};
