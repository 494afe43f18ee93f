//! JWT claims model.

use serde::{Deserialize, Serialize};

use caremap_core::UserId;

/// Which half of a token pair a claim set belongs to.
///
/// Access tokens authenticate requests; refresh tokens may only be exchanged
/// for a new access token. Presenting one where the other is expected fails
/// validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by every token this service issues.
///
/// `iat`/`exp` are Unix timestamps in seconds, as the signing library expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Username at issue time (display convenience only; never authorization).
    pub username: String,

    /// Access or refresh.
    pub token_type: TokenKind,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}
