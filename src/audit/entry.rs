//! Audit entry data structures
//!
//! Defines the audit log line format and the messages emitted for each
//! operation outcome.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::FilecryptError;

/// Operations that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    /// Present participle used in log messages ("encrypting")
    pub fn verb_ing(self) -> &'static str {
        match self {
            Operation::Encrypt => "encrypting",
            Operation::Decrypt => "decrypting",
        }
    }

    /// Past tense used in log messages ("Encrypted")
    pub fn verb_past(self) -> &'static str {
        match self {
            Operation::Encrypt => "Encrypted",
            Operation::Decrypt => "Decrypted",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Encrypt => write!(f, "encrypt"),
            Operation::Decrypt => write!(f, "decrypt"),
        }
    }
}

/// A single audit log line: `<ISO-8601 timestamp> - <message>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// When the message was recorded (UTC)
    pub timestamp: DateTime<Utc>,
    /// Free-form message
    pub message: String,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    /// Format as a single log line (without trailing newline)
    pub fn format_line(&self) -> String {
        format!(
            "{} - {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }

    /// Message for the start of an operation
    pub fn started_message(operation: Operation, path: &std::path::Path) -> String {
        format!("Started {} file {}", operation.verb_ing(), path.display())
    }

    /// Message for a completed operation
    pub fn succeeded_message(
        operation: Operation,
        path: &std::path::Path,
        output: &std::path::Path,
    ) -> String {
        format!(
            "{} file {} to {}",
            operation.verb_past(),
            path.display(),
            output.display()
        )
    }

    /// Message for a failed operation, naming the stage it failed in
    pub fn failed_message(
        operation: Operation,
        stage: impl std::fmt::Display,
        err: &FilecryptError,
    ) -> String {
        format!(
            "Error while {} file ({}): {}",
            operation.verb_ing(),
            stage,
            err
        )
    }
}
