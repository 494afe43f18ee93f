//! Patient-doctor mapping handlers.
//!
//! Creation runs a fixed check sequence, short-circuiting on first failure:
//! both ids present, patient owned, doctor owned, pair not already mapped.
//! Deletion requires the caller to own **both** endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;

use caremap_auth::owns;
use caremap_core::{DoctorId, MappingId, PatientId};
use caremap_records::Mapping;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthedUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_mappings).post(create_mapping))
        .route("/:id", delete(delete_mapping))
        .route("/patient/:patient_id", get(mappings_by_patient))
}

fn patient_denied() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Patient not found or access denied")
}

fn doctor_denied() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Doctor not found or access denied")
}

pub async fn list_mappings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_user): Extension<AuthedUser>,
) -> axum::response::Response {
    match services.mappings.list_mappings().await {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn create_mapping(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<dto::CreateMappingRequest>,
) -> axum::response::Response {
    // 1. Both identifiers must be present (blank counts as missing).
    let (patient_raw, doctor_raw) = match (body.patient, body.doctor) {
        (Some(p), Some(d)) if !p.trim().is_empty() && !d.trim().is_empty() => (p, d),
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "Both patient id and doctor id fields are required",
            );
        }
    };

    // 2. The patient must exist and be owned by the caller. An unparsable id
    //    can't name an owned patient, so it collapses into the same 404.
    let patient_id: PatientId = match patient_raw.parse() {
        Ok(v) => v,
        Err(_) => return patient_denied(),
    };
    let patient = match services.patients.find_patient(user.user_id, patient_id).await {
        Ok(Some(p)) => p,
        Ok(None) => return patient_denied(),
        Err(e) => return errors::repo_error_to_response(e),
    };

    // 3. Same for the doctor.
    let doctor_id: DoctorId = match doctor_raw.parse() {
        Ok(v) => v,
        Err(_) => return doctor_denied(),
    };
    let doctor = match services.doctors.find_doctor(doctor_id).await {
        Ok(Some(d)) if owns(user.user_id, &d) => d,
        Ok(_) => return doctor_denied(),
        Err(e) => return errors::repo_error_to_response(e),
    };

    // 4./5. Insert; the repository rejects a duplicate pair atomically.
    let mapping = Mapping::assign(patient.id, doctor.id, Utc::now().date_naive());
    match services.mappings.insert_mapping(mapping).await {
        Ok(view) => {
            tracing::info!(mapping_id = %view.id, "mapping created");
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_mapping(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: MappingId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id"),
    };

    let mapping = match services.mappings.find_mapping(id).await {
        Ok(Some(m)) => m,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "Mapping not found"),
        Err(e) => return errors::repo_error_to_response(e),
    };

    // The caller must own both endpoints; a mismatch on either side is 403.
    let owns_patient = match services
        .patients
        .find_patient(user.user_id, mapping.patient_id)
        .await
    {
        Ok(found) => found.is_some(),
        Err(e) => return errors::repo_error_to_response(e),
    };
    let owns_doctor = match services.doctors.find_doctor(mapping.doctor_id).await {
        Ok(Some(d)) => owns(user.user_id, &d),
        Ok(None) => false,
        Err(e) => return errors::repo_error_to_response(e),
    };

    if !owns_patient || !owns_doctor {
        return errors::json_error(StatusCode::FORBIDDEN, "You cannot delete this mapping");
    }

    match services.mappings.delete_mapping(mapping.id).await {
        Ok(()) => {
            tracing::info!(mapping_id = %mapping.id, "mapping deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn mappings_by_patient(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(patient_id): Path<String>,
) -> axum::response::Response {
    let patient_id: PatientId = match patient_id.parse() {
        Ok(v) => v,
        Err(_) => return patient_denied(),
    };

    // The patient must exist and be owned by the caller before any mapping
    // data is revealed.
    match services.patients.find_patient(user.user_id, patient_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return patient_denied(),
        Err(e) => return errors::repo_error_to_response(e),
    }

    match services.mappings.list_mappings_for_patient(patient_id).await {
        Ok(views) => (StatusCode::OK, Json(views)).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}
