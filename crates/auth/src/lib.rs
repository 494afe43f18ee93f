//! `caremap-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to hash credentials, mint and validate tokens, and decide ownership, but
//! never touches a request or a repository.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod tokens;
pub mod user;

pub use authorize::owns;
pub use claims::{Claims, TokenKind};
pub use tokens::{AuthError, Hs256TokenService, TokenPair, TokenValidator};
pub use user::{RegisterDraft, User};
