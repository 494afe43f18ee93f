//! Repository interfaces.
//!
//! One trait per entity, written against domain types only — no backend
//! leaks through the signatures. Implementations must enforce:
//!
//! - **Uniqueness**: usernames and emails (per table), and the
//!   `(patient, doctor)` mapping pair, atomically with the insert.
//! - **Cascade delete**: removing a patient or doctor removes every mapping
//!   that references it.
//! - **Owner scoping**: the patient lookups that take a `UserId` must never
//!   return another user's record.

use async_trait::async_trait;
use thiserror::Error;

use caremap_auth::User;
use caremap_core::{DoctorId, MappingId, PatientId, UserId};
use caremap_records::{Doctor, Mapping, MappingView, Patient};

pub mod in_memory;
pub mod postgres;

/// Repository operation error.
///
/// Infrastructure-level failures only; field validation happens in the domain
/// layer before a record ever reaches a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness constraint was violated.
    #[error("{message}")]
    Duplicate {
        field: &'static str,
        message: String,
    },

    /// The targeted record does not exist.
    #[error("not found")]
    NotFound,

    /// Backend failure (connection, query, pool). Logged, never surfaced in
    /// detail to API callers.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepoError {
    pub fn duplicate(field: &'static str, message: impl Into<String>) -> Self {
        Self::Duplicate {
            field,
            message: message.into(),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Account store: users and their credentials.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `Duplicate` on username/email collision.
    async fn insert_user(&self, user: User) -> RepoResult<User>;

    async fn find_user(&self, id: UserId) -> RepoResult<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// Patient records, owner-scoped throughout.
///
/// All lookups take the requesting owner: a miss and a foreign record are
/// indistinguishable by design.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Insert a new patient; fails with `Duplicate` on email collision.
    async fn insert_patient(&self, patient: Patient) -> RepoResult<Patient>;

    async fn list_patients(&self, owner: UserId) -> RepoResult<Vec<Patient>>;

    async fn find_patient(&self, owner: UserId, id: PatientId) -> RepoResult<Option<Patient>>;

    /// Persist an updated record; fails with `Duplicate` if the new email
    /// collides with another patient, `NotFound` if the record is gone.
    async fn update_patient(&self, patient: Patient) -> RepoResult<Patient>;

    /// Delete an owned patient and cascade its mappings. `NotFound` covers
    /// both absence and foreign ownership.
    async fn delete_patient(&self, owner: UserId, id: PatientId) -> RepoResult<()>;
}

/// Doctor records. Listing and lookup are system-wide (shared directory);
/// ownership is enforced by the caller via the `owns` predicate.
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Insert a new doctor; fails with `Duplicate` on email collision.
    async fn insert_doctor(&self, doctor: Doctor) -> RepoResult<Doctor>;

    async fn list_doctors(&self) -> RepoResult<Vec<Doctor>>;

    async fn find_doctor(&self, id: DoctorId) -> RepoResult<Option<Doctor>>;

    async fn update_doctor(&self, doctor: Doctor) -> RepoResult<Doctor>;

    /// Delete a doctor and cascade its mappings.
    async fn delete_doctor(&self, id: DoctorId) -> RepoResult<()>;
}

/// Patient-doctor mappings.
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Insert a new mapping. The duplicate-pair check is atomic with the
    /// insert: two concurrent creations of the same pair cannot both succeed.
    async fn insert_mapping(&self, mapping: Mapping) -> RepoResult<MappingView>;

    async fn list_mappings(&self) -> RepoResult<Vec<MappingView>>;

    async fn list_mappings_for_patient(&self, patient_id: PatientId) -> RepoResult<Vec<MappingView>>;

    async fn find_mapping(&self, id: MappingId) -> RepoResult<Option<Mapping>>;

    async fn delete_mapping(&self, id: MappingId) -> RepoResult<()>;
}
