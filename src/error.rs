//! Custom error types for filecrypt
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions, plus the mapping from errors to process
//! exit codes.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for filecrypt operations
#[derive(Error, Debug)]
pub enum FilecryptError {
    /// Missing or invalid command-line arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// Source file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Input is too short to hold a container
    #[error("Malformed container: expected at least {expected} bytes, got {actual}")]
    MalformedContainer { expected: usize, actual: usize },

    /// Padding or authentication check failed after decryption
    #[error("Wrong password or corrupted data")]
    WrongPasswordOrCorrupted,

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Output was written but the source file could not be deleted
    #[error(
        "Wrote {} but failed to remove original {}: {reason}",
        .output.display(),
        .original.display()
    )]
    OriginalNotRemoved {
        original: PathBuf,
        output: PathBuf,
        reason: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key derivation errors (invalid parameters)
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),
}

/// Coarse classification of errors, used for exit codes and log output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UsageError,
    FileNotFound,
    MalformedContainer,
    WrongPasswordOrCorrupted,
    IoFailure,
    Internal,
}

impl ErrorKind {
    /// Exit code used under the strict exit policy
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::UsageError => 1,
            ErrorKind::FileNotFound => 3,
            ErrorKind::MalformedContainer => 4,
            ErrorKind::WrongPasswordOrCorrupted => 5,
            ErrorKind::IoFailure => 6,
            ErrorKind::Internal => 7,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UsageError => "UsageError",
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::MalformedContainer => "MalformedContainer",
            ErrorKind::WrongPasswordOrCorrupted => "WrongPasswordOrCorrupted",
            ErrorKind::IoFailure => "IOFailure",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

impl FilecryptError {
    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Usage(_) => ErrorKind::UsageError,
            Self::FileNotFound(_) => ErrorKind::FileNotFound,
            Self::MalformedContainer { .. } => ErrorKind::MalformedContainer,
            Self::WrongPasswordOrCorrupted => ErrorKind::WrongPasswordOrCorrupted,
            Self::Io(_) | Self::OriginalNotRemoved { .. } => ErrorKind::IoFailure,
            Self::Config(_) | Self::KeyDerivation(_) | Self::Encryption(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Check if this is a wrong-password / integrity failure
    pub fn is_wrong_password(&self) -> bool {
        matches!(self, Self::WrongPasswordOrCorrupted)
    }
}

impl From<std::io::Error> for FilecryptError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FilecryptError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for filecrypt operations
pub type FilecryptResult<T> = Result<T, FilecryptError>;

/// How handled operation failures map to the process exit code
///
/// Usage errors exit 1 under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Log and report the failure, then exit 0
    #[default]
    Permissive,
    /// Exit with the error kind's own code
    Strict,
}

impl ExitPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Permissive
        }
    }

    /// Exit code for a failed operation
    pub fn exit_code(self, err: &FilecryptError) -> u8 {
        match (self, err.kind()) {
            (_, ErrorKind::UsageError) => ErrorKind::UsageError.exit_code(),
            (ExitPolicy::Permissive, _) => 0,
            (ExitPolicy::Strict, kind) => kind.exit_code(),
        }
    }
}
