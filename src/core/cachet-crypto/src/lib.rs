//! # Cachet Crypto
//!
//! Fixed-algorithm cryptographic primitives for an authentication layer.
//!
//! This crate provides four independent, stateless components:
//! - Salt generation (32 random bytes, hex encoded)
//! - Password digests (SHA-512 over salt text and password)
//! - Message encryption (AES-256-CBC, PKCS#7, random IV per message)
//! - Signed bearer tokens (HMAC-SHA-256)
//!
//! Randomness is injected through [`RandomSource`]; [`OsRandom`] is the
//! production source.
//!
//! ```
//! use cachet_crypto::{PasswordHasher, SaltGenerator, TokenCodec};
//!
//! let salt = SaltGenerator::new().generate().unwrap();
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("Secret123!", &salt).unwrap();
//! assert!(hasher.verify("Secret123!", &digest, &salt).unwrap());
//!
//! let codec = TokenCodec::new();
//! let token = codec.issue("user-42", b"shared secret").unwrap();
//! assert_eq!(codec.verify(&token, b"shared secret").unwrap(), "user-42");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cipher;
pub mod compare;
pub mod encoding;
pub mod error;
pub mod keys;
pub mod password;
pub mod random;
pub mod salt;
pub mod service;
pub mod token;

pub use cipher::SymmetricCipher;
pub use error::CryptoError;
pub use keys::CipherKey;
pub use password::PasswordHasher;
pub use random::{OsRandom, RandomSource};
pub use salt::SaltGenerator;
pub use service::CryptoService;
pub use token::{TokenClaims, TokenCodec};
