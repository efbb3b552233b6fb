//! Cryptographic functions for filecrypt
//!
//! Provides password-based key derivation, AES-256 encryption (CBC for the
//! legacy format, GCM for the sealed format) and the container that
//! carries nonce, salt and ciphertext on disk. `FileTransform` drives these
//! one stage at a time.

pub mod cipher;
pub mod container;
pub mod key_derivation;
pub mod secure_memory;

pub use cipher::Scheme;
pub use container::Container;
pub use key_derivation::{
    derive_argon2_key, derive_digest_key, DerivedKey, KeyDerivation, KeyDerivationParams,
};
pub use secure_memory::Password;

/// Pick the key derivation matching a decoded container
pub fn derivation_for<'a>(
    container: &'a Container,
    params: &'a KeyDerivationParams,
) -> KeyDerivation<'a> {
    match &container.salt {
        Some(salt) => KeyDerivation::Argon2id { salt, params },
        None => KeyDerivation::Digest,
    }
}
