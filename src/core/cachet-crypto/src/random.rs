//! Cryptographically secure random generation.
//!
//! Components that need randomness take a [`RandomSource`] instead of
//! reaching for a global generator, so tests can substitute a deterministic
//! one. [`OsRandom`] is the production source and uses the operating
//! system's CSPRNG.

use rand::{rngs::OsRng, RngCore};

use crate::error::CryptoError;

/// A source of cryptographically secure random bytes.
pub trait RandomSource: Send + Sync {
    /// Fills `dest` entirely with random bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system's CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| CryptoError::RandomSourceUnavailable(e.to_string()))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill_bytes(dest)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for std::sync::Arc<R> {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill_bytes(dest)
    }
}

/// Returns `len` random bytes from `rng`.
pub fn generate_bytes<R: RandomSource + ?Sized>(rng: &R, len: usize) -> Result<Vec<u8>, CryptoError> {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes)?;
    Ok(bytes)
}
