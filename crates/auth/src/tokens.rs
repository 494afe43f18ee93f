//! Token issuance and validation (HS256 JWTs).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use caremap_core::UserId;

use crate::claims::{Claims, TokenKind};

/// Authentication failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token")]
    InvalidToken,

    #[error("expected {expected} token, got {got}")]
    WrongTokenKind { expected: TokenKind, got: TokenKind },

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("credential hashing failed: {0}")]
    Hash(String),
}

/// An access/refresh token pair, as returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Validation seam used by the HTTP layer.
///
/// Kept as a trait so request middleware can hold an `Arc<dyn TokenValidator>`
/// and tests can substitute their own.
pub trait TokenValidator: Send + Sync {
    /// Decode and verify a token, requiring it to be of the expected kind.
    fn validate(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError>;
}

/// HS256 token service: mints and validates both halves of a token pair.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl Hs256TokenService {
    /// Default access-token lifetime.
    pub const ACCESS_TTL_MINUTES: i64 = 5;

    /// Default refresh-token lifetime.
    pub const REFRESH_TTL_DAYS: i64 = 1;

    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(Self::ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(Self::REFRESH_TTL_DAYS),
        }
    }

    /// Override token lifetimes (tests use short ones to exercise expiry).
    pub fn with_lifetimes(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Mint an access + refresh pair for a freshly authenticated user.
    pub fn issue_pair(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user_id, username, TokenKind::Access, now)?,
            refresh: self.issue(user_id, username, TokenKind::Refresh, now)?,
        })
    }

    /// Exchange a valid refresh token for a new access token.
    pub fn refresh_access(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.validate(refresh_token, TokenKind::Refresh, now)?;
        self.issue(claims.sub, &claims.username, TokenKind::Access, now)
    }

    fn issue(
        &self,
        user_id: UserId,
        username: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            token_type: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenValidator for Hs256TokenService {
    fn validate(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        // Expiry is checked against the caller-supplied clock, not the
        // library's, so validation stays deterministic in tests.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::InvalidToken)?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenKind {
                expected,
                got: claims.token_type,
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> Hs256TokenService {
        Hs256TokenService::new(b"test-secret")
    }

    #[test]
    fn issued_access_token_round_trips() {
        let svc = service();
        let user_id = UserId::new();
        let now = Utc::now();

        let pair = svc.issue_pair(user_id, "alice", now).unwrap();
        let claims = svc.validate(&pair.access, TokenKind::Access, now).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn refresh_token_rejected_where_access_expected() {
        let svc = service();
        let now = Utc::now();
        let pair = svc.issue_pair(UserId::new(), "alice", now).unwrap();

        let err = svc.validate(&pair.refresh, TokenKind::Access, now).unwrap_err();
        assert!(matches!(err, AuthError::WrongTokenKind { .. }));
    }

    #[test]
    fn expired_token_rejected() {
        let svc = service();
        let now = Utc::now();
        let pair = svc.issue_pair(UserId::new(), "alice", now).unwrap();

        let later = now + Duration::minutes(Hs256TokenService::ACCESS_TTL_MINUTES + 1);
        let err = svc.validate(&pair.access, TokenKind::Access, later).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn refresh_exchanges_for_new_access_token() {
        let svc = service();
        let user_id = UserId::new();
        let now = Utc::now();
        let pair = svc.issue_pair(user_id, "alice", now).unwrap();

        let access = svc.refresh_access(&pair.refresh, now).unwrap();
        let claims = svc.validate(&access, TokenKind::Access, now).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn access_token_cannot_be_used_to_refresh() {
        let svc = service();
        let now = Utc::now();
        let pair = svc.issue_pair(UserId::new(), "alice", now).unwrap();

        assert!(svc.refresh_access(&pair.access, now).is_err());
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let svc = service();
        let other = Hs256TokenService::new(b"other-secret");
        let now = Utc::now();
        let pair = other.issue_pair(UserId::new(), "mallory", now).unwrap();

        let err = svc.validate(&pair.access, TokenKind::Access, now).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
