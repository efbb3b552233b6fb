//! On-disk container format
//!
//! Legacy: `nonce(16) || ciphertext`
//! Sealed: `nonce(16) || salt(16) || ciphertext+tag`
//!
//! There is no header, magic or version field; the layout is chosen by the
//! configured scheme. The nonce is always the first 16 bytes.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use crate::error::{FilecryptError, FilecryptResult};

use super::cipher::{Scheme, NONCE_SIZE};
use super::key_derivation::SALT_SIZE;

/// Per-encryption random nonce / IV
pub type Nonce = [u8; NONCE_SIZE];

/// Per-encryption random Argon2id salt
pub type Salt = [u8; SALT_SIZE];

/// Generate a fresh random nonce
pub fn random_nonce() -> Nonce {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Generate a fresh random salt
pub fn random_salt() -> Salt {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// A decoded container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// The nonce used for this encryption
    pub nonce: Nonce,
    /// KDF salt (sealed scheme only)
    pub salt: Option<Salt>,
    /// The ciphertext (with tag for the sealed scheme)
    pub ciphertext: Vec<u8>,
}

impl Container {
    /// Create a legacy container
    pub fn new(nonce: Nonce, ciphertext: Vec<u8>) -> Self {
        Self {
            nonce,
            salt: None,
            ciphertext,
        }
    }

    /// Create a sealed container carrying its KDF salt
    pub fn with_salt(nonce: Nonce, salt: Salt, ciphertext: Vec<u8>) -> Self {
        Self {
            nonce,
            salt: Some(salt),
            ciphertext,
        }
    }

    /// Minimum encoded length for a scheme
    pub fn min_len(scheme: Scheme) -> usize {
        if scheme.uses_salt() {
            NONCE_SIZE + SALT_SIZE
        } else {
            NONCE_SIZE
        }
    }

    /// Serialize: nonce, then salt if present, then ciphertext
    pub fn encode(&self) -> Vec<u8> {
        let salt_len = self.salt.map_or(0, |s| s.len());
        let mut out = Vec::with_capacity(NONCE_SIZE + salt_len + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        if let Some(salt) = &self.salt {
            out.extend_from_slice(salt);
        }
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split raw bytes into their parts for the given scheme
    ///
    /// Purely structural: never touches a cipher.
    pub fn decode(bytes: &[u8], scheme: Scheme) -> FilecryptResult<Self> {
        let expected = Self::min_len(scheme);
        if bytes.len() < expected {
            return Err(FilecryptError::MalformedContainer {
                expected,
                actual: bytes.len(),
            });
        }

        let (nonce_bytes, rest) = bytes.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        if scheme.uses_salt() {
            let (salt_bytes, ciphertext) = rest.split_at(SALT_SIZE);
            let mut salt = [0u8; SALT_SIZE];
            salt.copy_from_slice(salt_bytes);
            Ok(Self::with_salt(nonce, salt, ciphertext.to_vec()))
        } else {
            Ok(Self::new(nonce, rest.to_vec()))
        }
    }
}
