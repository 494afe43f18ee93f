use axum::Router;

pub mod auth;
pub mod doctors;
pub mod mappings;
pub mod patients;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/patients", patients::router())
        .nest("/doctors", doctors::router())
        .nest("/mappings", mappings::router())
}
