//! `caremap-records` — domain entities for the patient/doctor registry.
//!
//! Plain records with ownership and relationship fields, plus the validation
//! rules for creating and updating them. No persistence or HTTP concerns here.

pub mod doctor;
pub mod mapping;
pub mod patient;

pub use doctor::{Doctor, DoctorDraft, DoctorUpdate};
pub use mapping::{Mapping, MappingView};
pub use patient::{Patient, PatientDraft, PatientUpdate};
