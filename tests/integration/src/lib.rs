//! Integration tests for Cachet.
//!
//! These tests drive the library the way an authentication service would:
//! register users, log them in, gate requests on tokens and exchange
//! encrypted messages. Persistence is the caller's job, so the fixture keeps
//! its user table in memory.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use cachet_crypto::token::DEFAULT_TOKEN_TTL_SECS;
use cachet_crypto::{CryptoService, TokenClaims};

// ============================================================================
// Fixture
// ============================================================================

/// A stored credential: the digest and the salt it was produced with.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub digest: String,
    pub salt: String,
}

/// Minimal authentication service built on `CryptoService`.
pub struct AuthFixture {
    service: CryptoService,
    secret: Vec<u8>,
    users: HashMap<String, UserRecord>,
    next_id: u64,
}

impl AuthFixture {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            service: CryptoService::new(),
            secret: secret.to_vec(),
            users: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn service(&self) -> &CryptoService {
        &self.service
    }

    pub fn user(&self, username: &str) -> Option<&UserRecord> {
        self.users.get(username)
    }

    /// Registers a user with a fresh salt.
    pub fn register(&mut self, username: &str, password: &str) -> Result<u64> {
        if self.users.contains_key(username) {
            bail!("user '{}' already exists", username);
        }

        let salt = self.service.generate_salt().context("salt generation")?;
        let digest = self
            .service
            .hash_password(password, &salt)
            .context("password hashing")?;

        let id = self.next_id;
        self.next_id += 1;
        self.users.insert(
            username.to_string(),
            UserRecord {
                id,
                username: username.to_string(),
                digest,
                salt,
            },
        );

        Ok(id)
    }

    /// Checks credentials and issues a login token.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let user = self
            .users
            .get(username)
            .context("invalid username or password")?;

        let valid = self
            .service
            .verify_password(password, &user.digest, &user.salt)
            .context("password verification")?;
        if !valid {
            bail!("invalid username or password");
        }

        let claims = TokenClaims::for_user(user.id, &user.username, DEFAULT_TOKEN_TTL_SECS);
        self.service
            .generate_claims_token(&claims, &self.secret)
            .context("token issue")
    }

    /// Validates a bearer token and returns its claims.
    pub fn authorize(&self, token: &str) -> Result<TokenClaims> {
        self.service
            .verify_claims_token(token, &self.secret)
            .context("invalid token")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use cachet_crypto::{CryptoError, PasswordHasher, SaltGenerator, SymmetricCipher, TokenCodec};

    use super::*;

    const SECRET: &[u8] = b"integration_secret_at_least_32_bytes";

    fn crypto_error(err: &anyhow::Error) -> Option<&CryptoError> {
        err.chain().find_map(|e| e.downcast_ref::<CryptoError>())
    }

    #[test]
    fn test_register_login_authorize() {
        let mut auth = AuthFixture::new(SECRET);
        let id = auth.register("alice", "Secret123!").unwrap();

        let token = auth.login("alice", "Secret123!").unwrap();
        let claims = auth.authorize(&token).unwrap();

        assert_eq!(claims.user_id, id);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_wrong_password_rejected() {
        let mut auth = AuthFixture::new(SECRET);
        auth.register("alice", "Secret123!").unwrap();

        assert!(auth.login("alice", "secret123!").is_err());
        assert!(auth.login("bob", "Secret123!").is_err());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut auth = AuthFixture::new(SECRET);
        auth.register("alice", "one").unwrap();
        assert!(auth.register("alice", "two").is_err());
    }

    #[test]
    fn test_same_password_different_salts() {
        let mut auth = AuthFixture::new(SECRET);
        auth.register("alice", "shared password").unwrap();
        auth.register("bob", "shared password").unwrap();

        let alice = auth.user("alice").unwrap();
        let bob = auth.user("bob").unwrap();
        assert_ne!(alice.salt, bob.salt);
        assert_ne!(alice.digest, bob.digest);
    }

    #[test]
    fn test_stored_digest_is_salt_text_then_password() {
        use sha2::{Digest, Sha512};

        let mut auth = AuthFixture::new(SECRET);
        auth.register("alice", "Secret123!").unwrap();
        let user = auth.user("alice").unwrap();

        let independent = hex::encode(Sha512::digest(format!("{}Secret123!", user.salt)));
        assert_eq!(user.digest, independent);
    }

    #[test]
    fn test_forged_claims_rejected() {
        let mut auth = AuthFixture::new(SECRET);
        auth.register("alice", "Secret123!").unwrap();
        let token = auth.login("alice", "Secret123!").unwrap();

        let forged = token.replace(r#""user_id":1"#, r#""user_id":2"#);
        assert_ne!(forged, token);

        let err = auth.authorize(&forged).unwrap_err();
        assert!(matches!(
            crypto_error(&err),
            Some(CryptoError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_token_from_other_issuer_rejected() {
        let mut alice_service = AuthFixture::new(SECRET);
        alice_service.register("alice", "pw").unwrap();
        let token = alice_service.login("alice", "pw").unwrap();

        let other = AuthFixture::new(b"a completely different secret");
        let err = other.authorize(&token).unwrap_err();
        assert!(matches!(
            crypto_error(&err),
            Some(CryptoError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new();
        let claims = TokenClaims::new(1, "alice", 1_000);
        let token = codec.issue_claims(&claims, SECRET).unwrap();

        let auth = AuthFixture::new(SECRET);
        let err = auth.authorize(&token).unwrap_err();
        assert!(matches!(crypto_error(&err), Some(CryptoError::TokenExpired)));
    }

    #[test]
    fn test_encrypted_message_exchange() {
        let auth = AuthFixture::new(SECRET);
        let sender = auth.service();
        let receiver = CryptoService::new();
        let key = sender.generate_key().unwrap();

        let wire = sender
            .encrypt_message_base64("Привет, мир! \u{0}binary tail".as_bytes(), &key)
            .unwrap();
        let received = receiver.decrypt_message_base64(&wire, &key).unwrap();

        assert_eq!(&*received, "Привет, мир! \u{0}binary tail".as_bytes());
    }

    #[test]
    fn test_components_work_standalone() {
        let salt = SaltGenerator::new().generate().unwrap();
        let digest = PasswordHasher::new().hash("pw", &salt).unwrap();
        assert!(PasswordHasher::new().verify("pw", &digest, &salt).unwrap());

        let key = [9u8; 32];
        let cipher = SymmetricCipher::new();
        let encrypted = cipher.encrypt(b"standalone", &key).unwrap();
        assert_eq!(&*cipher.decrypt(&encrypted, &key).unwrap(), b"standalone");
    }

    #[test]
    fn test_concurrent_use() {
        let service = Arc::new(CryptoService::new());
        let key = Arc::new(service.generate_key().unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                let key = Arc::clone(&key);
                thread::spawn(move || {
                    let salt = service.generate_salt().unwrap();
                    let password = format!("password-{}", i);
                    let digest = service.hash_password(&password, &salt).unwrap();
                    assert!(service.verify_password(&password, &digest, &salt).unwrap());

                    let message = format!("message-{}", i);
                    let encrypted = service.encrypt_message(message.as_bytes(), &key).unwrap();
                    let decrypted = service.decrypt_message(&encrypted, &key).unwrap();
                    assert_eq!(&*decrypted, message.as_bytes());

                    let token = service.generate_token(&format!("user-{}", i), SECRET).unwrap();
                    assert_eq!(service.verify_token(&token, SECRET).unwrap(), format!("user-{}", i));

                    salt
                })
            })
            .collect();

        let salts: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(salts.len(), 8);
    }
}
