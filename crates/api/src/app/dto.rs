//! Request/response DTOs and JSON mapping helpers.
//!
//! Create/update request bodies deserialize straight into the domain draft
//! types (`RegisterDraft`, `PatientDraft`, ...); this module holds the rest.

use serde::Deserialize;
use serde_json::json;

use caremap_auth::User;
use caremap_records::{Doctor, Patient};

/// Login input.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh input.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Mapping creation input. Both ids are required; they arrive as strings so a
/// missing or blank field is a rule violation, not a body-decoding failure.
#[derive(Debug, Deserialize)]
pub struct CreateMappingRequest {
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default)]
    pub doctor: Option<String>,
}

/// Registration response: the created account, password never echoed.
pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
    })
}

/// Patient response; `user` is the owner's username.
pub fn patient_to_json(patient: &Patient, owner_username: &str) -> serde_json::Value {
    json!({
        "id": patient.id,
        "user": owner_username,
        "name": patient.name,
        "age": patient.age,
        "email": patient.email,
        "phone": patient.phone,
        "created_at": patient.created_at,
    })
}

/// Doctor response; `user` is the owning user's id (doctors are listed
/// system-wide, so the owner is not necessarily the caller).
pub fn doctor_to_json(doctor: &Doctor) -> serde_json::Value {
    json!({
        "id": doctor.id,
        "user": doctor.owner,
        "name": doctor.name,
        "email": doctor.email,
        "phone": doctor.phone,
        "specialization": doctor.specialization,
        "experience_years": doctor.experience_years,
        "clinic_address": doctor.clinic_address,
    })
}
