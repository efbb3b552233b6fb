//! AES-256 encryption/decryption
//!
//! Two schemes share the same 16-byte nonce field:
//!
//! - `Legacy`: AES-256-CBC with PKCS#7 padding, the nonce used as IV.
//!   Unauthenticated; a wrong key is detected through padding validation
//!   only.
//! - `Sealed`: AES-256-GCM with a 16-byte nonce and a 16-byte tag appended
//!   to the ciphertext.
//!
//! Both report any decryption failure as `WrongPasswordOrCorrupted`.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes256, Block};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::Aead;
use aes_gcm::{AesGcm, Nonce as GcmNonce};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{FilecryptError, FilecryptResult};

use super::key_derivation::DerivedKey;

/// Size of the nonce / IV in bytes
pub const NONCE_SIZE: usize = 16;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Size of the GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// AES-256-GCM with a 128-bit nonce
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Encryption scheme used for a container
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// AES-256-CBC, unsalted digest key (compatible format)
    #[default]
    Legacy,
    /// AES-256-GCM, salted Argon2id key
    Sealed,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Legacy => write!(f, "legacy"),
            Scheme::Sealed => write!(f, "sealed"),
        }
    }
}

impl Scheme {
    /// Whether this scheme stores a KDF salt in the container
    pub fn uses_salt(self) -> bool {
        matches!(self, Scheme::Sealed)
    }

    /// Encrypt plaintext under the key and nonce
    pub fn encrypt(
        self,
        key: &DerivedKey,
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> FilecryptResult<Vec<u8>> {
        match self {
            Scheme::Legacy => Ok(encrypt_cbc(key, nonce, plaintext)),
            Scheme::Sealed => encrypt_gcm(key, nonce, plaintext),
        }
    }

    /// Decrypt ciphertext under the key and nonce
    pub fn decrypt(
        self,
        key: &DerivedKey,
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> FilecryptResult<Vec<u8>> {
        match self {
            Scheme::Legacy => decrypt_cbc(key, nonce, ciphertext),
            Scheme::Sealed => decrypt_gcm(key, nonce, ciphertext),
        }
    }
}

/// AES-256-CBC encryption with PKCS#7 padding
///
/// Always emits at least one block; empty input yields a full padding block.
pub fn encrypt_cbc(key: &DerivedKey, iv: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256::new(key.as_bytes().into());

    let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut buffer = Vec::with_capacity(plaintext.len() + pad);
    buffer.extend_from_slice(plaintext);
    buffer.resize(plaintext.len() + pad, pad as u8);

    let mut prev_block = *iv;
    for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
        xor_in_place(block, &prev_block);
        cipher.encrypt_block(Block::from_mut_slice(block));
        prev_block.copy_from_slice(block);
    }

    buffer
}

/// AES-256-CBC decryption with PKCS#7 padding validation
pub fn decrypt_cbc(
    key: &DerivedKey,
    iv: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> FilecryptResult<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(FilecryptError::WrongPasswordOrCorrupted);
    }

    let cipher = Aes256::new(key.as_bytes().into());

    let mut buffer = ciphertext.to_vec();
    let mut prev_block = *iv;
    for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
        let mut current = [0u8; BLOCK_SIZE];
        current.copy_from_slice(block);

        cipher.decrypt_block(Block::from_mut_slice(block));
        xor_in_place(block, &prev_block);

        prev_block = current;
    }

    match pkcs7_unpadded_len(&buffer) {
        Some(len) => {
            buffer.truncate(len);
            Ok(buffer)
        }
        None => {
            buffer.zeroize();
            Err(FilecryptError::WrongPasswordOrCorrupted)
        }
    }
}

/// AES-256-GCM encryption with a 16-byte nonce
pub fn encrypt_gcm(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> FilecryptResult<Vec<u8>> {
    let cipher = Aes256Gcm16::new(key.as_bytes().into());
    let nonce = GcmNonce::<U16>::from_slice(nonce);

    cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| FilecryptError::Encryption(format!("Encryption failed: {}", e)))
}

/// AES-256-GCM decryption; any tag mismatch is a wrong password or corruption
pub fn decrypt_gcm(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> FilecryptResult<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(FilecryptError::WrongPasswordOrCorrupted);
    }

    let cipher = Aes256Gcm16::new(key.as_bytes().into());
    let nonce = GcmNonce::<U16>::from_slice(nonce);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| FilecryptError::WrongPasswordOrCorrupted)
}

fn xor_in_place(block: &mut [u8], other: &[u8; BLOCK_SIZE]) {
    for (b, o) in block.iter_mut().zip(other.iter()) {
        *b ^= o;
    }
}

/// Length of the data once PKCS#7 padding is stripped, if the padding is valid
fn pkcs7_unpadded_len(buffer: &[u8]) -> Option<usize> {
    let pad = *buffer.last()? as usize;
    if pad == 0 || pad > BLOCK_SIZE || pad > buffer.len() {
        return None;
    }

    let start = buffer.len() - pad;
    buffer[start..]
        .iter()
        .all(|&b| b as usize == pad)
        .then_some(start)
}
