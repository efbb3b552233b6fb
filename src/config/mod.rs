//! Configuration module for filecrypt
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::FilecryptPaths;
pub use settings::Settings;
