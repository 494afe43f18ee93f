//! Patient-doctor mapping.
//!
//! # Invariants
//! - At most one mapping exists per (patient, doctor) pair at any time
//!   (enforced by the repository at insert).
//! - A mapping is only valid while both endpoints exist; deleting either
//!   endpoint cascades to the mapping.
//! - `assigned_date` is set at creation and immutable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use caremap_core::{DoctorId, MappingId, PatientId};

/// An association record linking exactly one patient to exactly one doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: MappingId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub assigned_date: NaiveDate,
}

impl Mapping {
    /// Construct a new mapping assigned on the given date.
    ///
    /// Cross-entity checks (endpoint existence, ownership, duplicates) are the
    /// caller's and the repository's responsibility.
    pub fn assign(patient_id: PatientId, doctor_id: DoctorId, assigned_date: NaiveDate) -> Self {
        Self {
            id: MappingId::new(),
            patient_id,
            doctor_id,
            assigned_date,
        }
    }

    /// Whether this mapping links the given pair.
    pub fn links(&self, patient_id: PatientId, doctor_id: DoctorId) -> bool {
        self.patient_id == patient_id && self.doctor_id == doctor_id
    }
}

/// Denormalized read shape for mapping list/detail responses.
///
/// Carries the display names of both endpoints so callers don't have to make
/// follow-up lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingView {
    pub id: MappingId,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub assigned_date: NaiveDate,
}

impl MappingView {
    pub fn new(mapping: &Mapping, patient_name: impl Into<String>, doctor_name: impl Into<String>) -> Self {
        Self {
            id: mapping.id,
            patient_id: mapping.patient_id,
            doctor_id: mapping.doctor_id,
            patient_name: patient_name.into(),
            doctor_name: doctor_name.into(),
            assigned_date: mapping.assigned_date,
        }
    }
}
