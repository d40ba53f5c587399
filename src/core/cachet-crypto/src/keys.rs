//! Cipher key type with automatic memory zeroization.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::cipher::KEY_SIZE;
use crate::error::CryptoError;
use crate::random::RandomSource;

/// A 256-bit AES key.
///
/// The library never persists keys; this wrapper only guarantees the bytes
/// are erased from memory when the key is dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey {
    bytes: [u8; KEY_SIZE],
}

impl CipherKey {
    /// Draws a new random key from `rng`.
    pub fn generate<R: RandomSource + ?Sized>(rng: &R) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Creates a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the input is not exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidArgument(format!(
                "key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }

        let mut key_bytes = [0u8; KEY_SIZE];
        key_bytes.copy_from_slice(bytes);

        Ok(Self { bytes: key_bytes })
    }

    /// Parses a key from 64 hex characters. Surrounding whitespace is ignored.
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let decoded = Zeroizing::new(
            hex::decode(hex.trim())
                .map_err(|e| CryptoError::InvalidArgument(format!("key is not hex: {}", e)))?,
        );
        Self::from_bytes(&decoded)
    }

    /// Encodes the key as lowercase hex.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    /// Returns the raw key bytes.
    ///
    /// Use with caution - the returned slice is not zeroized automatically.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
