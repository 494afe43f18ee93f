//! Doctor record.
//!
//! Same ownership shape as [`crate::patient::Patient`]; doctors additionally
//! carry practice details (specialization, experience, clinic address).

use serde::{Deserialize, Serialize};

use caremap_core::fields;
use caremap_core::{DoctorId, DomainResult, FieldErrors, Owned, UserId};

/// A doctor record owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub owner: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience_years: u32,
    pub clinic_address: String,
}

impl Owned for Doctor {
    fn owner(&self) -> UserId {
        self.owner
    }
}

/// Client-supplied fields for creating a doctor.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub experience_years: i64,
    pub clinic_address: String,
}

impl DoctorDraft {
    /// Validate and materialize the draft under the given owner.
    pub fn into_doctor(self, owner: UserId) -> DomainResult<Doctor> {
        let mut errors = FieldErrors::new();

        let name = fields::required(&mut errors, "name", &self.name);
        fields::max_length(&mut errors, "name", &name, 100);
        let email = fields::email(&mut errors, "email", &self.email);
        let phone = fields::required(&mut errors, "phone", &self.phone);
        fields::max_length(&mut errors, "phone", &phone, 10);
        let specialization = fields::required(&mut errors, "specialization", &self.specialization);
        fields::max_length(&mut errors, "specialization", &specialization, 100);
        let experience_years =
            fields::non_negative(&mut errors, "experience_years", self.experience_years);
        let clinic_address = fields::required(&mut errors, "clinic_address", &self.clinic_address);

        errors.into_result()?;

        Ok(Doctor {
            id: DoctorId::new(),
            owner,
            name,
            email,
            phone,
            specialization,
            experience_years,
            clinic_address,
        })
    }
}

/// Partial update for a doctor; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i64>,
    pub clinic_address: Option<String>,
}

impl DoctorUpdate {
    /// Validate the populated fields and apply them to an existing record.
    pub fn apply_to(self, doctor: &mut Doctor) -> DomainResult<()> {
        let mut errors = FieldErrors::new();

        let name = self.name.map(|v| {
            let v = fields::required(&mut errors, "name", &v);
            fields::max_length(&mut errors, "name", &v, 100);
            v
        });
        let email = self.email.map(|v| fields::email(&mut errors, "email", &v));
        let phone = self.phone.map(|v| {
            let v = fields::required(&mut errors, "phone", &v);
            fields::max_length(&mut errors, "phone", &v, 10);
            v
        });
        let specialization = self.specialization.map(|v| {
            let v = fields::required(&mut errors, "specialization", &v);
            fields::max_length(&mut errors, "specialization", &v, 100);
            v
        });
        let experience_years = self
            .experience_years
            .map(|v| fields::non_negative(&mut errors, "experience_years", v));
        let clinic_address = self
            .clinic_address
            .map(|v| fields::required(&mut errors, "clinic_address", &v));

        errors.into_result()?;

        if let Some(v) = name {
            doctor.name = v;
        }
        if let Some(v) = email {
            doctor.email = v;
        }
        if let Some(v) = phone {
            doctor.phone = v;
        }
        if let Some(v) = specialization {
            doctor.specialization = v;
        }
        if let Some(v) = experience_years {
            doctor.experience_years = v;
        }
        if let Some(v) = clinic_address {
            doctor.clinic_address = v;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caremap_core::DomainError;

    fn draft() -> DoctorDraft {
        DoctorDraft {
            name: "Smith".to_string(),
            email: "smith@clinic.com".to_string(),
            phone: "0987654321".to_string(),
            specialization: "Cardiology".to_string(),
            experience_years: 12,
            clinic_address: "1 Harley Street".to_string(),
        }
    }

    #[test]
    fn valid_draft_materializes() {
        let owner = UserId::new();
        let doctor = draft().into_doctor(owner).unwrap();

        assert_eq!(doctor.owner, owner);
        assert_eq!(doctor.specialization, "Cardiology");
        assert_eq!(doctor.experience_years, 12);
    }

    #[test]
    fn negative_experience_is_a_field_error() {
        let mut d = draft();
        d.experience_years = -3;

        let err = d.into_doctor(UserId::new()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.iter().any(|e| e.field == "experience_years"));
    }

    #[test]
    fn update_applies_only_populated_fields() {
        let mut doctor = draft().into_doctor(UserId::new()).unwrap();

        let update = DoctorUpdate {
            specialization: Some("Neurology".to_string()),
            ..Default::default()
        };
        update.apply_to(&mut doctor).unwrap();

        assert_eq!(doctor.specialization, "Neurology");
        assert_eq!(doctor.name, "Smith");
    }
}
