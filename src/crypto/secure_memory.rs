//! Secure memory handling for passwords
//!
//! Provides a password type that zeros its contents on drop and never
//! prints them.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A password string that is zeroed on drop
///
/// Never persisted; only consumed by key derivation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password {
    inner: String,
}

impl Password {
    /// Create a new Password
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Get the UTF-8 bytes fed to the KDF
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("len", &self.inner.len())
            .finish()
    }
}

// Don't print the contents in Display output
impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED {} bytes]", self.inner.len())
    }
}
