//! Password salt generation.

use tracing::debug;
use zeroize::Zeroizing;

use crate::encoding::{copy_into, ensure_capacity, hex_encode};
use crate::error::CryptoError;
use crate::random::{generate_bytes, OsRandom, RandomSource};

/// Number of random bytes in a salt.
pub const SALT_BYTES: usize = 32;

/// Length of a hex-encoded salt.
pub const SALT_HEX_LEN: usize = SALT_BYTES * 2;

/// Produces fresh salts for password hashing.
#[derive(Debug, Clone, Default)]
pub struct SaltGenerator<R = OsRandom> {
    rng: R,
}

impl SaltGenerator<OsRandom> {
    /// Creates a generator backed by the operating system's CSPRNG.
    pub fn new() -> Self {
        Self::with_source(OsRandom)
    }
}

impl<R: RandomSource> SaltGenerator<R> {
    /// Creates a generator drawing from `rng`.
    pub fn with_source(rng: R) -> Self {
        Self { rng }
    }

    /// Generates a salt: 32 random bytes as 64 lowercase hex characters.
    pub fn generate(&self) -> Result<String, CryptoError> {
        let raw = Zeroizing::new(generate_bytes(&self.rng, SALT_BYTES)?);

        debug!(len = SALT_HEX_LEN, "Salt generated");
        Ok(hex_encode(&raw))
    }

    /// Writes a fresh salt into the front of `buf`.
    ///
    /// Returns the number of bytes written (always [`SALT_HEX_LEN`]).
    pub fn generate_into(&self, buf: &mut [u8]) -> Result<usize, CryptoError> {
        ensure_capacity(SALT_HEX_LEN, buf.len())?;
        let salt = self.generate()?;
        copy_into(salt.as_bytes(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::encoding::is_lower_hex;
    use crate::random::testing::{FailingRandom, FixedRandom};

    #[test]
    fn test_salt_format() {
        let generator = SaltGenerator::new();
        for _ in 0..50 {
            let salt = generator.generate().unwrap();
            assert_eq!(salt.len(), SALT_HEX_LEN);
            assert!(is_lower_hex(&salt), "unexpected characters in {}", salt);
        }
    }

    #[test]
    fn test_salts_are_unique() {
        let generator = SaltGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(generator.generate().unwrap()));
        }
    }

    #[test]
    fn test_fixed_source_encoding() {
        let generator = SaltGenerator::with_source(FixedRandom(vec![0xab, 0x01]));
        let salt = generator.generate().unwrap();
        assert_eq!(salt, "ab01".repeat(SALT_BYTES / 2));
    }

    #[test]
    fn test_random_source_unavailable() {
        let generator = SaltGenerator::with_source(FailingRandom);
        assert!(matches!(
            generator.generate(),
            Err(CryptoError::RandomSourceUnavailable(_))
        ));
    }

    #[test]
    fn test_generate_into() {
        let generator = SaltGenerator::new();
        let mut buf = [0u8; 65];
        let written = generator.generate_into(&mut buf).unwrap();
        assert_eq!(written, SALT_HEX_LEN);
        assert!(is_lower_hex(std::str::from_utf8(&buf[..written]).unwrap()));
    }

    #[test]
    fn test_generate_into_too_small() {
        let generator = SaltGenerator::new();
        let mut buf = [0u8; SALT_HEX_LEN - 1];
        assert!(matches!(
            generator.generate_into(&mut buf),
            Err(CryptoError::BufferTooSmall {
                needed: SALT_HEX_LEN,
                available: 63
            })
        ));
    }
}
