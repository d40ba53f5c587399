//! Cryptographic error types.

use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Empty, missing or mis-sized input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller-provided output slice cannot hold the result.
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required to hold the full output.
        needed: usize,
        /// Bytes available in the caller's slice.
        available: usize,
    },

    /// The secure random source could not supply bytes.
    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    /// The digest engine could not be initialized or finalized.
    #[error("digest engine failure: {0}")]
    DigestEngineFailure(String),

    /// The block cipher engine could not be initialized or finalized.
    #[error("cipher engine failure: {0}")]
    CipherEngineFailure(String),

    /// The MAC engine could not be initialized.
    #[error("mac engine failure: {0}")]
    MacEngineFailure(String),

    /// Token structure could not be parsed.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token signature does not match its payload.
    #[error("token signature mismatch")]
    SignatureMismatch,

    /// Decrypted padding did not validate (wrong key or corrupted ciphertext).
    #[error("invalid padding")]
    PaddingInvalid,

    /// Token claims are past their expiration time.
    #[error("token expired")]
    TokenExpired,
}

impl CryptoError {
    /// Returns true for failures of an underlying provider (digest, cipher,
    /// MAC or random source) rather than of the caller's input.
    pub fn is_engine_failure(&self) -> bool {
        matches!(
            self,
            Self::RandomSourceUnavailable(_)
                | Self::DigestEngineFailure(_)
                | Self::CipherEngineFailure(_)
                | Self::MacEngineFailure(_)
        )
    }
}
