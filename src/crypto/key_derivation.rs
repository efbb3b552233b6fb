//! Key derivation from passwords
//!
//! Two derivations are supported:
//!
//! - `Digest`: the legacy scheme. The key is the first 32 characters of the
//!   base64-encoded SHA-256 digest of the password. Unsalted and fast, kept
//!   so files produced by the legacy format stay readable.
//! - `Argon2id`: salted, memory-hard derivation used by the sealed scheme.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{FilecryptError, FilecryptResult};

use super::secure_memory::Password;

/// Length of a derived key (AES-256)
pub const KEY_SIZE: usize = 32;

/// Length of the Argon2id salt stored in sealed containers
pub const SALT_SIZE: usize = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    /// Create params with specific values
    pub fn with_values(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }
}

/// A derived 32-byte encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// How a password is turned into a key
#[derive(Debug, Clone, Copy)]
pub enum KeyDerivation<'a> {
    /// Unsalted SHA-256 digest, base64-encoded and truncated
    Digest,
    /// Salted Argon2id
    Argon2id {
        salt: &'a [u8; SALT_SIZE],
        params: &'a KeyDerivationParams,
    },
}

impl KeyDerivation<'_> {
    /// Derive a key from the password
    pub fn derive(&self, password: &Password) -> FilecryptResult<DerivedKey> {
        match self {
            KeyDerivation::Digest => Ok(derive_digest_key(password)),
            KeyDerivation::Argon2id { salt, params } => derive_argon2_key(password, salt, params),
        }
    }
}

/// Derive the legacy key: `base64(sha256(password))[..32]`
///
/// Infallible and deterministic.
pub fn derive_digest_key(password: &Password) -> DerivedKey {
    let mut digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
    let encoded = Zeroizing::new(STANDARD.encode(digest));
    digest.zeroize();

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&encoded.as_bytes()[..KEY_SIZE]);

    DerivedKey { key }
}

/// Derive a key with Argon2id using the given salt and cost parameters
pub fn derive_argon2_key(
    password: &Password,
    salt: &[u8; SALT_SIZE],
    params: &KeyDerivationParams,
) -> FilecryptResult<DerivedKey> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| FilecryptError::KeyDerivation(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| FilecryptError::KeyDerivation(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
