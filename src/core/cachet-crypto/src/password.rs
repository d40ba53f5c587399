//! Salted password digests.
//!
//! The digest is `SHA-512(salt || password)` where `salt` is hashed as its
//! hex text, not as the raw bytes it encodes. Stored credentials depend on
//! this exact construction, so the order and encoding must not change.

use sha2::{Digest, Sha512};
use tracing::debug;
use zeroize::Zeroizing;

use crate::compare::ct_eq;
use crate::encoding::{copy_into, ensure_capacity, hex_encode};
use crate::error::CryptoError;

/// Size of a SHA-512 digest in bytes.
pub const DIGEST_BYTES: usize = 64;

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = DIGEST_BYTES * 2;

/// Hashes and verifies passwords against stored digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher.
    pub fn new() -> Self {
        Self
    }

    /// Computes the hex digest of `salt` followed by `password`.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - password or salt is empty
    pub fn hash(&self, password: &str, salt: &str) -> Result<String, CryptoError> {
        let digest = digest(password, salt)?;
        Ok(hex_encode(digest.as_slice()))
    }

    /// Writes the hex digest into the front of `buf`.
    ///
    /// Returns the number of bytes written (always [`DIGEST_HEX_LEN`]).
    pub fn hash_into(&self, password: &str, salt: &str, buf: &mut [u8]) -> Result<usize, CryptoError> {
        ensure_capacity(DIGEST_HEX_LEN, buf.len())?;
        let hash = self.hash(password, salt)?;
        copy_into(hash.as_bytes(), buf)
    }

    /// Checks `password` against a stored `digest` produced with `salt`.
    ///
    /// Returns `Ok(false)` on a mismatch; errors are reserved for invalid
    /// arguments. The comparison runs in constant time.
    pub fn verify(&self, password: &str, digest: &str, salt: &str) -> Result<bool, CryptoError> {
        if digest.is_empty() {
            return Err(CryptoError::InvalidArgument("digest is empty".to_string()));
        }

        let expected = Zeroizing::new(self.hash(password, salt)?);
        let matched = ct_eq(expected.as_bytes(), digest.as_bytes());

        debug!(matched, "Password verified");
        Ok(matched)
    }
}

fn digest(password: &str, salt: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidArgument("password is empty".to_string()));
    }
    if salt.is_empty() {
        return Err(CryptoError::InvalidArgument("salt is empty".to_string()));
    }

    let mut hasher = Sha512::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    Ok(Zeroizing::new(hasher.finalize().to_vec()))
}
