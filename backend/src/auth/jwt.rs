//! Session token issuance and verification
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}`. They are not stored
//! anywhere: a token is valid exactly when its signature checks out against
//! the process secret and `exp` is still in the future.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Why a token was rejected. Only ever logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTokenKind {
    Malformed,
    BadSignature,
    Expired,
}

impl fmt::Display for InvalidTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvalidTokenKind::Malformed => "malformed",
            InvalidTokenKind::BadSignature => "bad_signature",
            InvalidTokenKind::Expired => "expired",
        })
    }
}

/// The single failure returned by [`TokenService::verify`].
///
/// Callers treat every rejection alike; `kind` exists for log lines.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid token ({kind})")]
pub struct InvalidToken {
    pub kind: InvalidTokenKind,
}

impl InvalidToken {
    fn new(kind: InvalidTokenKind) -> Self {
        Self { kind }
    }
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token service
///
/// Build once at startup and share through `AppState`; clones only bump
/// reference counts.
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    ttl: Duration,
    validation: Arc<Validation>,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: JwtKeys::new(secret),
            ttl: Duration::seconds(ttl_secs),
            validation: Arc::new(validation),
        }
    }

    /// Issue a token for `user_id`, valid from now for the configured ttl
    #[inline]
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Verify a token and return its subject
    #[inline]
    pub fn verify(&self, token: &str) -> Result<Uuid, InvalidToken> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, InvalidToken> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(|e| {
            InvalidToken::new(match e.kind() {
                ErrorKind::InvalidSignature => InvalidTokenKind::BadSignature,
                ErrorKind::ExpiredSignature => InvalidTokenKind::Expired,
                _ => InvalidTokenKind::Malformed,
            })
        })?;

        if data.claims.exp <= now.timestamp() {
            return Err(InvalidToken::new(InvalidTokenKind::Expired));
        }

        Uuid::parse_str(&data.claims.sub).map_err(|_| InvalidToken::new(InvalidTokenKind::Malformed))
    }
}
