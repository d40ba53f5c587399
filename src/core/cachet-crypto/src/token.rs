//! Signed bearer tokens.
//!
//! Token format: `<header>.<payload>.<signature>`
//!
//! - `header` is the fixed literal [`TOKEN_HEADER`]
//! - `payload` is carried as raw text, NOT base64url-encoded
//! - `signature` is lowercase hex of HMAC-SHA-256(secret, payload)
//!
//! The header looks like a JWT header but the scheme is not interoperable
//! with JWT libraries: the payload is unencoded and the signature covers the
//! payload only. Payloads therefore cannot contain `.`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::compare::ct_eq;
use crate::encoding::{copy_into, hex_encode};
use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Fixed header segment (base64url of `{"alg":"HS256","typ":"JWT"}`).
pub const TOKEN_HEADER: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

/// Segment delimiter.
pub const TOKEN_DELIMITER: char = '.';

/// Size of an HMAC-SHA-256 tag in bytes.
pub const MAC_SIZE: usize = 32;

/// Length of the hex-encoded signature segment.
pub const SIGNATURE_HEX_LEN: usize = MAC_SIZE * 2;

/// Default lifetime of login claims (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Issues and verifies tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    /// Creates a new token codec.
    pub fn new() -> Self {
        Self
    }

    /// Issues a token carrying `payload`, signed with `secret`.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - empty secret, or payload contains `.`
    pub fn issue(&self, payload: &str, secret: &[u8]) -> Result<String, CryptoError> {
        if payload.contains(TOKEN_DELIMITER) {
            return Err(CryptoError::InvalidArgument(
                "payload must not contain '.'".to_string(),
            ));
        }

        let signature = sign(payload, secret)?;

        let mut token =
            String::with_capacity(TOKEN_HEADER.len() + payload.len() + SIGNATURE_HEX_LEN + 2);
        token.push_str(TOKEN_HEADER);
        token.push(TOKEN_DELIMITER);
        token.push_str(payload);
        token.push(TOKEN_DELIMITER);
        token.push_str(&signature);

        debug!(payload_len = payload.len(), "Token issued");
        Ok(token)
    }

    /// Issues a token into the front of `buf`, returning its length.
    pub fn issue_into(&self, payload: &str, secret: &[u8], buf: &mut [u8]) -> Result<usize, CryptoError> {
        let token = self.issue(payload, secret)?;
        copy_into(token.as_bytes(), buf)
    }

    /// Verifies `token` against `secret` and returns its payload.
    ///
    /// The signature is recomputed over the payload and compared in constant
    /// time; the payload is returned only on a match.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - empty secret
    /// * `MalformedToken` - fewer than two delimiters, or unknown header
    /// * `SignatureMismatch` - the signature does not match the payload
    pub fn verify(&self, token: &str, secret: &[u8]) -> Result<String, CryptoError> {
        let parts = TokenParts::parse(token)?;
        if parts.header != TOKEN_HEADER {
            return Err(CryptoError::MalformedToken("unexpected header".to_string()));
        }

        let expected = sign(parts.payload, secret)?;
        if !ct_eq(expected.as_bytes(), parts.signature.as_bytes()) {
            warn!(payload_len = parts.payload.len(), "Token signature mismatch");
            return Err(CryptoError::SignatureMismatch);
        }

        debug!(payload_len = parts.payload.len(), "Token verified");
        Ok(parts.payload.to_string())
    }

    /// Verifies `token` and copies its payload into the front of `buf`.
    pub fn verify_into(&self, token: &str, secret: &[u8], buf: &mut [u8]) -> Result<usize, CryptoError> {
        let payload = self.verify(token, secret)?;
        copy_into(payload.as_bytes(), buf)
    }

    /// Extracts the payload WITHOUT checking the signature.
    ///
    /// Only for logging and debugging; never base an authorization decision
    /// on the result.
    pub fn parse_unverified<'a>(&self, token: &'a str) -> Result<&'a str, CryptoError> {
        TokenParts::parse(token).map(|parts| parts.payload)
    }

    /// Issues a token whose payload is `claims` serialized as JSON.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - empty secret, or username contains `.`
    pub fn issue_claims(&self, claims: &TokenClaims, secret: &[u8]) -> Result<String, CryptoError> {
        if claims.username.contains(TOKEN_DELIMITER) {
            return Err(CryptoError::InvalidArgument(format!(
                "username '{}' must not contain '.'",
                claims.username
            )));
        }

        let payload = serde_json::to_string(claims)
            .map_err(|e| CryptoError::InvalidArgument(format!("unserializable claims: {}", e)))?;
        self.issue(&payload, secret)
    }

    /// Verifies `token` and decodes its claims, rejecting them if they
    /// expired before `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Everything [`verify`](Self::verify) returns, plus:
    /// * `MalformedToken` - payload is not valid claims JSON
    /// * `TokenExpired` - `exp` is before `now`
    pub fn verify_claims(&self, token: &str, secret: &[u8], now: i64) -> Result<TokenClaims, CryptoError> {
        let payload = self.verify(token, secret)?;
        let claims: TokenClaims = serde_json::from_str(&payload)
            .map_err(|e| CryptoError::MalformedToken(format!("invalid claims: {}", e)))?;

        if claims.is_expired(now) {
            debug!(exp = claims.exp, now, "Token claims expired");
            return Err(CryptoError::TokenExpired);
        }

        Ok(claims)
    }
}

/// Borrowed segments of a token.
struct TokenParts<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> TokenParts<'a> {
    /// Splits on the first and second delimiter; the signature is everything
    /// after the second.
    fn parse(token: &'a str) -> Result<Self, CryptoError> {
        let (header, rest) = token
            .split_once(TOKEN_DELIMITER)
            .ok_or_else(|| CryptoError::MalformedToken("missing payload delimiter".to_string()))?;
        let (payload, signature) = rest
            .split_once(TOKEN_DELIMITER)
            .ok_or_else(|| CryptoError::MalformedToken("missing signature delimiter".to_string()))?;

        Ok(Self {
            header,
            payload,
            signature,
        })
    }
}

fn sign(payload: &str, secret: &[u8]) -> Result<String, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::InvalidArgument("secret is empty".to_string()));
    }

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| CryptoError::MacEngineFailure(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex_encode(&mac.finalize().into_bytes()))
}

/// Login claims carried in a token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Numeric user identifier.
    pub user_id: u64,
    /// Login name.
    pub username: String,
    /// Expiration time (Unix seconds).
    pub exp: i64,
}

impl TokenClaims {
    /// Creates claims with an explicit expiration time.
    pub fn new(user_id: u64, username: impl Into<String>, exp: i64) -> Self {
        Self {
            user_id,
            username: username.into(),
            exp,
        }
    }

    /// Creates claims expiring `ttl_secs` from now.
    pub fn for_user(user_id: u64, username: impl Into<String>, ttl_secs: i64) -> Self {
        Self::new(user_id, username, unix_now().saturating_add(ttl_secs))
    }

    /// Returns true if the claims expired before `now` (Unix seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp < now
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
