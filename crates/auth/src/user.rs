//! User account record and registration validation.
//!
//! # Invariants
//! - `username` and `email` are globally unique (enforced by the user
//!   repository at insert).
//! - The password is stored only as an argon2id hash and never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caremap_core::{fields, DomainError, DomainResult, FieldErrors, UserId};

use crate::password;

/// A registered user: the root of ownership for patients and doctors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC-format argon2id hash. Write-only at the API surface.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Verify a login attempt against the stored credential.
    pub fn verify_password(&self, plain: &str) -> bool {
        password::verify_password(plain, &self.password_hash)
    }
}

/// Registration input: desired username, email and plaintext password.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterDraft {
    /// Validate the draft and produce a user with a hashed credential.
    ///
    /// Uniqueness of username/email is checked by the repository; everything
    /// field-shaped is checked here.
    pub fn into_user(self, now: DateTime<Utc>) -> DomainResult<User> {
        let mut errors = FieldErrors::new();

        let username = fields::required(&mut errors, "username", &self.username);
        fields::max_length(&mut errors, "username", &username, 150);
        let email = fields::email(&mut errors, "email", &self.email);
        password::check_policy(&mut errors, &self.password);

        errors.into_result()?;

        let password_hash = password::hash_password(&self.password)
            .map_err(|e| DomainError::validation("password", e.to_string()))?;

        Ok(User {
            id: UserId::new(),
            username,
            email,
            password_hash,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RegisterDraft {
        RegisterDraft {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "s3cure-enough".to_string(),
        }
    }

    #[test]
    fn register_hashes_the_password() {
        let user = draft().into_user(Utc::now()).unwrap();

        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "s3cure-enough");
        assert!(user.verify_password("s3cure-enough"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn short_password_is_a_field_error() {
        let mut d = draft();
        d.password = "short".to_string();

        let err = d.into_user(Utc::now()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "password"));
    }

    #[test]
    fn blank_username_and_bad_email_are_field_errors() {
        let mut d = draft();
        d.username = " ".to_string();
        d.email = "nope".to_string();

        let err = d.into_user(Utc::now()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "username"));
        assert!(errors.iter().any(|e| e.field == "email"));
    }

    #[test]
    fn serialized_user_never_contains_the_hash() {
        let user = draft().into_user(Utc::now()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }
}
