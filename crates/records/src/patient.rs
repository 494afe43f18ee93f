//! Patient record.
//!
//! # Invariants
//! - A patient belongs to exactly one user (the owner never changes).
//! - `created_at` is set at creation and immutable thereafter.
//! - `age` is a non-negative integer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use caremap_core::fields;
use caremap_core::{DomainResult, FieldErrors, Owned, PatientId, UserId};

/// A patient record owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub owner: UserId,
    pub name: String,
    pub age: u32,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl Owned for Patient {
    fn owner(&self) -> UserId {
        self.owner
    }
}

/// Client-supplied fields for creating a patient.
///
/// `age` is signed on purpose: a negative value must surface as a field-level
/// validation error, not a body-decoding failure.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientDraft {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub phone: String,
}

impl PatientDraft {
    /// Validate and materialize the draft under the given owner.
    ///
    /// The owner is always server-assigned; a draft can never name one.
    pub fn into_patient(self, owner: UserId, now: DateTime<Utc>) -> DomainResult<Patient> {
        let mut errors = FieldErrors::new();

        let name = fields::required(&mut errors, "name", &self.name);
        fields::max_length(&mut errors, "name", &name, 100);
        let age = fields::non_negative(&mut errors, "age", self.age);
        let email = fields::email(&mut errors, "email", &self.email);
        let phone = fields::required(&mut errors, "phone", &self.phone);
        fields::max_length(&mut errors, "phone", &phone, 10);

        errors.into_result()?;

        Ok(Patient {
            id: PatientId::new(),
            owner,
            name,
            age,
            email,
            phone,
            created_at: now,
        })
    }
}

/// Partial update for a patient; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PatientUpdate {
    /// Validate the populated fields and apply them to an existing record.
    ///
    /// `id`, `owner` and `created_at` are immutable and never touched.
    pub fn apply_to(self, patient: &mut Patient) -> DomainResult<()> {
        let mut errors = FieldErrors::new();

        let name = self.name.map(|v| {
            let v = fields::required(&mut errors, "name", &v);
            fields::max_length(&mut errors, "name", &v, 100);
            v
        });
        let age = self.age.map(|v| fields::non_negative(&mut errors, "age", v));
        let email = self.email.map(|v| fields::email(&mut errors, "email", &v));
        let phone = self.phone.map(|v| {
            let v = fields::required(&mut errors, "phone", &v);
            fields::max_length(&mut errors, "phone", &v, 10);
            v
        });

        errors.into_result()?;

        if let Some(v) = name {
            patient.name = v;
        }
        if let Some(v) = age {
            patient.age = v;
        }
        if let Some(v) = email {
            patient.email = v;
        }
        if let Some(v) = phone {
            patient.phone = v;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caremap_core::DomainError;

    fn draft() -> PatientDraft {
        PatientDraft {
            name: "Bob".to_string(),
            age: 30,
            email: "bob@x.com".to_string(),
            phone: "1234567890".to_string(),
        }
    }

    #[test]
    fn valid_draft_materializes() {
        let owner = UserId::new();
        let now = Utc::now();
        let patient = draft().into_patient(owner, now).unwrap();

        assert_eq!(patient.owner, owner);
        assert_eq!(patient.name, "Bob");
        assert_eq!(patient.age, 30);
        assert_eq!(patient.created_at, now);
    }

    #[test]
    fn negative_age_is_a_field_error() {
        let mut d = draft();
        d.age = -5;

        let err = d.into_patient(UserId::new(), Utc::now()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "age"));
    }

    #[test]
    fn blank_name_and_long_phone_are_field_errors() {
        let mut d = draft();
        d.name = "  ".to_string();
        d.phone = "12345678901".to_string();

        let err = d.into_patient(UserId::new(), Utc::now()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "name"));
        assert!(errors.iter().any(|e| e.field == "phone"));
    }

    #[test]
    fn update_leaves_immutable_fields_alone() {
        let owner = UserId::new();
        let now = Utc::now();
        let mut patient = draft().into_patient(owner, now).unwrap();
        let id = patient.id;

        let update = PatientUpdate {
            name: Some("Robert".to_string()),
            age: None,
            email: None,
            phone: None,
        };
        update.apply_to(&mut patient).unwrap();

        assert_eq!(patient.name, "Robert");
        assert_eq!(patient.age, 30);
        assert_eq!(patient.id, id);
        assert_eq!(patient.owner, owner);
        assert_eq!(patient.created_at, now);
    }

    #[test]
    fn update_rejects_invalid_fields_without_applying() {
        let mut patient = draft().into_patient(UserId::new(), Utc::now()).unwrap();

        let update = PatientUpdate {
            name: Some("Robert".to_string()),
            age: Some(-1),
            email: None,
            phone: None,
        };
        assert!(update.apply_to(&mut patient).is_err());
        // Nothing applied on failure, including the valid field.
        assert_eq!(patient.name, "Bob");
    }
}
