//! filecrypt - Password-based encryption of single files
//!
//! This library provides the core functionality for the `filecrypt` command.
//! A file is encrypted into a sibling `<name>_encrypted.txt` container (or
//! decrypted back), the original is removed once the output is on disk, and
//! every attempt is recorded in a timestamped audit log.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types and exit-code policy
//! - `crypto`: Key derivation, ciphers and the container layout
//! - `transform`: The encrypt/decrypt pipeline over files
//! - `audit`: Audit logging system
//! - `cli`: Command-line parsing and dispatch
//!
//! # Example
//!
//! ```rust,ignore
//! use filecrypt::audit::FileAuditLog;
//! use filecrypt::crypto::Password;
//! use filecrypt::transform::{FileTransform, TransformOptions};
//!
//! let audit = FileAuditLog::new("log");
//! let transform = FileTransform::new(TransformOptions::default(), &audit);
//! let report = transform.encrypt("notes.txt".as_ref(), &Password::new("hunter2"))?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transform;

pub use error::{FilecryptError, FilecryptResult};
