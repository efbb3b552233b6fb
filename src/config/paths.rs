//! Path management for filecrypt
//!
//! Provides XDG-compliant path resolution for the settings file.
//!
//! ## Path Resolution Order
//!
//! 1. `FILECRYPT_HOME` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/filecrypt` or `~/.config/filecrypt`
//! 3. Windows: `%APPDATA%\filecrypt`
//!
//! The audit log lives under `./log` relative to the working directory
//! unless overridden in settings or on the command line.

use std::path::PathBuf;

use crate::error::FilecryptError;

/// Name of the default audit log directory
pub const DEFAULT_LOG_DIR: &str = "log";

/// Manages all paths used by filecrypt
#[derive(Debug, Clone)]
pub struct FilecryptPaths {
    /// Base directory for configuration
    base_dir: PathBuf,
}

impl FilecryptPaths {
    /// Create a new FilecryptPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, FilecryptError> {
        let base_dir = match std::env::var_os("FILECRYPT_HOME") {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create FilecryptPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/filecrypt/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Default audit log directory, relative to the working directory
    pub fn default_log_dir() -> PathBuf {
        PathBuf::from(DEFAULT_LOG_DIR)
    }
}

/// Resolve the default config directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, FilecryptError> {
    // Unix (Linux/macOS): Use XDG_CONFIG_HOME if set, otherwise ~/.config
    if let Some(config_base) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(config_base).join("filecrypt"));
    }

    let home = std::env::var_os("HOME")
        .ok_or_else(|| FilecryptError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".config").join("filecrypt"))
}

/// Resolve the default config directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, FilecryptError> {
    // Windows: Use APPDATA
    let appdata = std::env::var("APPDATA")
        .map_err(|_| FilecryptError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("filecrypt"))
}
