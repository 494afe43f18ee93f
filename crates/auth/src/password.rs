//! Password hashing and policy.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use caremap_core::FieldErrors;

use crate::tokens::AuthError;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password into a PHC-format argon2id string.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// An unparsable stored hash verifies as false rather than erroring; the
/// caller only ever learns "credentials did not match".
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Password policy check, accumulating field-level errors.
pub fn check_policy(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            "password",
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn policy_rejects_short_passwords() {
        let mut errors = FieldErrors::new();
        check_policy(&mut errors, "short");
        assert!(!errors.is_empty());

        let mut errors = FieldErrors::new();
        check_policy(&mut errors, "long enough password");
        assert!(errors.is_empty());
    }
}
