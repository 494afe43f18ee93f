//! `caremap-api` — HTTP surface for the patient/doctor registry.

pub mod app;
pub mod context;
pub mod middleware;
