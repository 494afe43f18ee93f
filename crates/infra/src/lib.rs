//! `caremap-infra` — persistence layer.
//!
//! Repository traits per entity plus two interchangeable backends: an
//! in-memory store (tests/dev) and a Postgres store (production).

pub mod repo;

pub use repo::in_memory::InMemoryStore;
pub use repo::postgres::PgStore;
pub use repo::{
    DoctorRepository, MappingRepository, PatientRepository, RepoError, RepoResult, UserRepository,
};
