//! Patient CRUD, owner-scoped throughout.
//!
//! A patient owned by someone else is indistinguishable from a missing one:
//! every miss is a uniform 404, so existence never leaks across users.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use caremap_core::PatientId;
use caremap_records::{PatientDraft, PatientUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthedUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route(
            "/:id",
            get(get_patient)
                .put(replace_patient)
                .patch(modify_patient)
                .delete(delete_patient),
        )
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Patient not found")
}

/// Owner-scoped id parse: an unparsable id can't name an owned patient, so it
/// gets the same uniform 404 as any other miss.
fn parse_id(raw: &str) -> Result<PatientId, axum::response::Response> {
    raw.parse().map_err(|_| not_found())
}

pub async fn list_patients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
) -> axum::response::Response {
    match services.patients.list_patients(user.user_id).await {
        Ok(patients) => {
            let items: Vec<_> = patients
                .iter()
                .map(|p| dto::patient_to_json(p, &user.username))
                .collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn create_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<PatientDraft>,
) -> axum::response::Response {
    let patient = match body.into_patient(user.user_id, Utc::now()) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.patients.insert_patient(patient).await {
        Ok(p) => {
            tracing::info!(patient_id = %p.id, "patient created");
            (StatusCode::CREATED, Json(dto::patient_to_json(&p, &user.username))).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.patients.find_patient(user.user_id, id).await {
        Ok(Some(p)) => (StatusCode::OK, Json(dto::patient_to_json(&p, &user.username))).into_response(),
        Ok(None) => not_found(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

/// PUT: full replace — every mutable field is required.
pub async fn replace_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<PatientDraft>,
) -> axum::response::Response {
    let update = PatientUpdate {
        name: Some(body.name),
        age: Some(body.age),
        email: Some(body.email),
        phone: Some(body.phone),
    };
    apply_update(services, user, &id, update).await
}

/// PATCH: partial update — absent fields are left untouched.
pub async fn modify_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<PatientUpdate>,
) -> axum::response::Response {
    apply_update(services, user, &id, body).await
}

async fn apply_update(
    services: Arc<AppServices>,
    user: AuthedUser,
    raw_id: &str,
    update: PatientUpdate,
) -> axum::response::Response {
    let id = match parse_id(raw_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut patient = match services.patients.find_patient(user.user_id, id).await {
        Ok(Some(p)) => p,
        Ok(None) => return not_found(),
        Err(e) => return errors::repo_error_to_response(e),
    };

    if let Err(e) = update.apply_to(&mut patient) {
        return errors::domain_error_to_response(e);
    }

    match services.patients.update_patient(patient).await {
        Ok(p) => (StatusCode::OK, Json(dto::patient_to_json(&p, &user.username))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.patients.delete_patient(user.user_id, id).await {
        Ok(()) => {
            tracing::info!(patient_id = %id, "patient deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(caremap_infra::RepoError::NotFound) => not_found(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
