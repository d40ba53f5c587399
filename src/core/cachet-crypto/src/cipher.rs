//! AES-256-CBC message encryption.
//!
//! Every call draws a fresh IV from the component's [`RandomSource`] and
//! prepends it to the ciphertext.
//! Format: `iv (16 bytes) || ciphertext (PKCS#7 padded, multiple of 16)`
//!
//! Ciphertext is always an explicit-length byte slice; zero bytes in either
//! plaintext or ciphertext carry no special meaning. CBC provides no
//! integrity: pair it with a MAC when ciphertext can be tampered with.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::encoding::{copy_into, ensure_capacity};
use crate::error::CryptoError;
use crate::random::{OsRandom, RandomSource};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = BLOCK_SIZE;

/// Returns the exact encrypted size of a `message_len` byte message,
/// including the IV and padding.
pub const fn encrypted_len(message_len: usize) -> usize {
    IV_SIZE + (message_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Encrypts and decrypts messages under caller-supplied keys.
#[derive(Debug, Clone, Default)]
pub struct SymmetricCipher<R = OsRandom> {
    rng: R,
}

impl SymmetricCipher<OsRandom> {
    /// Creates a cipher drawing IVs from the operating system's CSPRNG.
    pub fn new() -> Self {
        Self::with_source(OsRandom)
    }
}

impl<R: RandomSource> SymmetricCipher<R> {
    /// Creates a cipher drawing IVs from `rng`.
    pub fn with_source(rng: R) -> Self {
        Self { rng }
    }

    /// Encrypts `message` under a 32-byte `key`.
    ///
    /// # Returns
    ///
    /// `iv || ciphertext`, exactly `encrypted_len(message.len())` bytes.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - key is not 32 bytes
    /// * `RandomSourceUnavailable` - no IV could be drawn
    /// * `CipherEngineFailure` - the cipher could not be initialized
    pub fn encrypt(&self, message: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut result = vec![0u8; encrypted_len(message.len())];
        let written = self.encrypt_into(message, key, &mut result)?;
        result.truncate(written);
        Ok(result)
    }

    /// Encrypts `message` into the front of `buf`, returning the number of
    /// bytes written.
    pub fn encrypt_into(&self, message: &[u8], key: &[u8], buf: &mut [u8]) -> Result<usize, CryptoError> {
        check_key(key)?;
        let needed = encrypted_len(message.len());
        ensure_capacity(needed, buf.len())?;

        let (iv, body) = buf[..needed].split_at_mut(IV_SIZE);
        self.rng.fill_bytes(iv)?;

        let cipher = Aes256CbcEnc::new_from_slices(key, iv)
            .map_err(|e| CryptoError::CipherEngineFailure(e.to_string()))?;

        body[..message.len()].copy_from_slice(message);
        let ciphertext_len = cipher
            .encrypt_padded_mut::<Pkcs7>(body, message.len())
            .map_err(|_| CryptoError::CipherEngineFailure("padding overflow".to_string()))?
            .len();

        debug!(plaintext_len = message.len(), ciphertext_len, "Message encrypted");
        Ok(IV_SIZE + ciphertext_len)
    }

    /// Decrypts `iv || ciphertext` as produced by [`encrypt`](Self::encrypt).
    ///
    /// # Returns
    ///
    /// Plaintext wrapped in `Zeroizing` for automatic memory cleanup.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - key is not 32 bytes, or the input is not an IV
    ///   followed by a non-empty whole number of blocks
    /// * `CipherEngineFailure` - the cipher could not be initialized
    /// * `PaddingInvalid` - wrong key or corrupted ciphertext
    pub fn decrypt(&self, encrypted: &[u8], key: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        check_key(key)?;
        check_ciphertext_len(encrypted)?;

        let (iv, body) = encrypted.split_at(IV_SIZE);
        let cipher = Aes256CbcDec::new_from_slices(key, iv)
            .map_err(|e| CryptoError::CipherEngineFailure(e.to_string()))?;

        let plaintext = cipher.decrypt_padded_vec_mut::<Pkcs7>(body).map_err(|_| {
            warn!(ciphertext_len = body.len(), "Decryption padding check failed");
            CryptoError::PaddingInvalid
        })?;

        debug!(plaintext_len = plaintext.len(), "Message decrypted");
        Ok(Zeroizing::new(plaintext))
    }

    /// Decrypts into the front of `buf`, returning the plaintext length.
    pub fn decrypt_into(&self, encrypted: &[u8], key: &[u8], buf: &mut [u8]) -> Result<usize, CryptoError> {
        let plaintext = self.decrypt(encrypted, key)?;
        copy_into(&plaintext, buf)
    }
}

fn check_key(key: &[u8]) -> Result<(), CryptoError> {
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidArgument(format!(
            "key must be {} bytes, got {}",
            KEY_SIZE,
            key.len()
        )));
    }
    Ok(())
}

fn check_ciphertext_len(encrypted: &[u8]) -> Result<(), CryptoError> {
    if encrypted.len() < IV_SIZE + BLOCK_SIZE {
        return Err(CryptoError::InvalidArgument(format!(
            "ciphertext too short: {} bytes",
            encrypted.len()
        )));
    }
    if (encrypted.len() - IV_SIZE) % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidArgument(format!(
            "ciphertext is not a whole number of {}-byte blocks",
            BLOCK_SIZE
        )));
    }
    Ok(())
}
