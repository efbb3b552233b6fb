//! User settings for filecrypt
//!
//! Manages the persisted defaults: encryption scheme, Argon2id costs,
//! decrypted output name, audit log location and exit-code policy.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::FilecryptPaths;
use crate::crypto::{KeyDerivationParams, Scheme};
use crate::error::FilecryptError;

/// Default name given to decrypted output
pub const DEFAULT_DECRYPTED_FILE_NAME: &str = "test.txt";

/// User settings for filecrypt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Scheme used for both directions
    #[serde(default)]
    pub scheme: Scheme,

    /// Argon2id cost parameters (sealed scheme only)
    #[serde(default)]
    pub kdf: KeyDerivationParams,

    /// File name written by decryption, in the input's directory
    #[serde(default = "default_decrypted_file_name")]
    pub decrypted_file_name: String,

    /// Audit log directory; `./log` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Map each error kind to its own exit code instead of exiting 0
    #[serde(default)]
    pub strict_exit_codes: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_decrypted_file_name() -> String {
    DEFAULT_DECRYPTED_FILE_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            scheme: Scheme::default(),
            kdf: KeyDerivationParams::default(),
            decrypted_file_name: default_decrypted_file_name(),
            log_dir: None,
            strict_exit_codes: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &FilecryptPaths) -> Result<Self, FilecryptError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                FilecryptError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                FilecryptError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Missing file means defaults; nothing is written back
            Ok(Settings::default())
        }
    }

    /// Reject values that would misbehave at run time
    pub fn validate(&self) -> Result<(), FilecryptError> {
        validate_file_name(&self.decrypted_file_name)
    }

    /// Audit log directory after applying the default
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(FilecryptPaths::default_log_dir)
    }
}

/// A decrypted file name must be a bare file name, not a path
pub fn validate_file_name(name: &str) -> Result<(), FilecryptError> {
    let is_bare = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');

    if is_bare {
        Ok(())
    } else {
        Err(FilecryptError::Config(format!(
            "Decrypted file name must be a plain file name, got '{}'",
            name
        )))
    }
}
