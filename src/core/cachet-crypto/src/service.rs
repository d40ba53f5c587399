//! One-stop facade over the four components.
//!
//! The components never call each other; `CryptoService` is a caller-side
//! convenience that owns one of each and shares a single random source
//! between the salt generator and the cipher.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use zeroize::Zeroizing;

use crate::cipher::SymmetricCipher;
use crate::error::CryptoError;
use crate::keys::CipherKey;
use crate::password::PasswordHasher;
use crate::random::{OsRandom, RandomSource};
use crate::salt::SaltGenerator;
use crate::token::{TokenClaims, TokenCodec};

/// Salt, digest, cipher and token operations behind one value.
pub struct CryptoService {
    rng: Arc<dyn RandomSource>,
    salts: SaltGenerator<Arc<dyn RandomSource>>,
    hasher: PasswordHasher,
    cipher: SymmetricCipher<Arc<dyn RandomSource>>,
    tokens: TokenCodec,
}

impl CryptoService {
    /// Creates a service backed by the operating system's CSPRNG.
    pub fn new() -> Self {
        Self::with_source(Arc::new(OsRandom))
    }

    /// Creates a service drawing all randomness from `rng`.
    pub fn with_source(rng: Arc<dyn RandomSource>) -> Self {
        Self {
            salts: SaltGenerator::with_source(Arc::clone(&rng)),
            cipher: SymmetricCipher::with_source(Arc::clone(&rng)),
            rng,
            hasher: PasswordHasher::new(),
            tokens: TokenCodec::new(),
        }
    }

    /// Generates a fresh 64-character hex salt.
    pub fn generate_salt(&self) -> Result<String, CryptoError> {
        self.salts.generate()
    }

    /// Hashes `password` with `salt`.
    pub fn hash_password(&self, password: &str, salt: &str) -> Result<String, CryptoError> {
        self.hasher.hash(password, salt)
    }

    /// Checks `password` against a stored digest.
    pub fn verify_password(&self, password: &str, digest: &str, salt: &str) -> Result<bool, CryptoError> {
        self.hasher.verify(password, digest, salt)
    }

    /// Generates a new random cipher key.
    pub fn generate_key(&self) -> Result<CipherKey, CryptoError> {
        CipherKey::generate(&*self.rng)
    }

    /// Encrypts `message` under `key`, returning `iv || ciphertext`.
    pub fn encrypt_message(&self, message: &[u8], key: &CipherKey) -> Result<Vec<u8>, CryptoError> {
        self.cipher.encrypt(message, key.as_bytes())
    }

    /// Decrypts `iv || ciphertext` under `key`.
    pub fn decrypt_message(&self, encrypted: &[u8], key: &CipherKey) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.cipher.decrypt(encrypted, key.as_bytes())
    }

    /// Encrypts `message` and encodes the result as standard base64, for
    /// transport in text fields.
    pub fn encrypt_message_base64(&self, message: &[u8], key: &CipherKey) -> Result<String, CryptoError> {
        let encrypted = self.encrypt_message(message, key)?;
        Ok(BASE64.encode(encrypted))
    }

    /// Decodes standard base64 and decrypts the result.
    pub fn decrypt_message_base64(&self, encoded: &str, key: &CipherKey) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let encrypted = BASE64
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidArgument(format!("invalid base64: {}", e)))?;
        self.decrypt_message(&encrypted, key)
    }

    /// Issues a token carrying `payload`.
    pub fn generate_token(&self, payload: &str, secret: &[u8]) -> Result<String, CryptoError> {
        self.tokens.issue(payload, secret)
    }

    /// Verifies a token and returns its payload.
    pub fn verify_token(&self, token: &str, secret: &[u8]) -> Result<String, CryptoError> {
        self.tokens.verify(token, secret)
    }

    /// Issues a token carrying login claims.
    pub fn generate_claims_token(&self, claims: &TokenClaims, secret: &[u8]) -> Result<String, CryptoError> {
        self.tokens.issue_claims(claims, secret)
    }

    /// Verifies a claims token against the current time.
    pub fn verify_claims_token(&self, token: &str, secret: &[u8]) -> Result<TokenClaims, CryptoError> {
        self.tokens
            .verify_claims(token, secret, crate::token::unix_now())
    }
}

impl Default for CryptoService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CryptoService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoService").finish_non_exhaustive()
    }
}
