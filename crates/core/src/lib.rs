//! `caremap-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod fields;
pub mod id;

pub use entity::Owned;
pub use error::{DomainError, DomainResult, FieldError, FieldErrors};
pub use id::{DoctorId, MappingId, PatientId, UserId};
