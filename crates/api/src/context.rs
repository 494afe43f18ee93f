//! Request context.

use caremap_core::UserId;

/// The authenticated user for the current request.
///
/// Produced by the auth middleware from validated token claims and passed
/// explicitly to every handler — there is no ambient "current user".
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: UserId,
    pub username: String,
}
