//! Doctor CRUD.
//!
//! Listing is system-wide (doctors act as a shared directory), but every
//! detail operation checks ownership explicitly and answers 403 for a doctor
//! that exists under another user — unlike the patient routes' uniform 404.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use caremap_auth::owns;
use caremap_core::DoctorId;
use caremap_records::{Doctor, DoctorDraft, DoctorUpdate};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthedUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_doctors).post(create_doctor))
        .route(
            "/:id",
            get(get_doctor)
                .put(replace_doctor)
                .patch(modify_doctor)
                .delete(delete_doctor),
        )
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Doctor not found")
}

fn forbidden() -> axum::response::Response {
    errors::json_error(
        StatusCode::FORBIDDEN,
        "You do not have permission to access this doctor",
    )
}

/// Load a doctor and authorize the caller: 404 if absent, 403 if owned by
/// someone else.
async fn load_owned(
    services: &AppServices,
    user: &AuthedUser,
    raw_id: &str,
) -> Result<Doctor, axum::response::Response> {
    let id: DoctorId = raw_id
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid id"))?;

    let doctor = match services.doctors.find_doctor(id).await {
        Ok(Some(d)) => d,
        Ok(None) => return Err(not_found()),
        Err(e) => return Err(errors::repo_error_to_response(e)),
    };

    if !owns(user.user_id, &doctor) {
        return Err(forbidden());
    }
    Ok(doctor)
}

pub async fn list_doctors(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_user): Extension<AuthedUser>,
) -> axum::response::Response {
    match services.doctors.list_doctors().await {
        Ok(doctors) => {
            let items: Vec<_> = doctors.iter().map(dto::doctor_to_json).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn create_doctor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Json(body): Json<DoctorDraft>,
) -> axum::response::Response {
    let doctor = match body.into_doctor(user.user_id) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.doctors.insert_doctor(doctor).await {
        Ok(d) => {
            tracing::info!(doctor_id = %d.id, "doctor created");
            (StatusCode::CREATED, Json(dto::doctor_to_json(&d))).into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn get_doctor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match load_owned(&services, &user, &id).await {
        Ok(d) => (StatusCode::OK, Json(dto::doctor_to_json(&d))).into_response(),
        Err(resp) => resp,
    }
}

/// PUT: full replace — every mutable field is required.
pub async fn replace_doctor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<DoctorDraft>,
) -> axum::response::Response {
    let update = DoctorUpdate {
        name: Some(body.name),
        email: Some(body.email),
        phone: Some(body.phone),
        specialization: Some(body.specialization),
        experience_years: Some(body.experience_years),
        clinic_address: Some(body.clinic_address),
    };
    apply_update(services, user, &id, update).await
}

/// PATCH: partial update — absent fields are left untouched.
pub async fn modify_doctor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
    Json(body): Json<DoctorUpdate>,
) -> axum::response::Response {
    apply_update(services, user, &id, body).await
}

async fn apply_update(
    services: Arc<AppServices>,
    user: AuthedUser,
    raw_id: &str,
    update: DoctorUpdate,
) -> axum::response::Response {
    let mut doctor = match load_owned(&services, &user, raw_id).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    if let Err(e) = update.apply_to(&mut doctor) {
        return errors::domain_error_to_response(e);
    }

    match services.doctors.update_doctor(doctor).await {
        Ok(d) => (StatusCode::OK, Json(dto::doctor_to_json(&d))).into_response(),
        Err(e) => errors::repo_error_to_response(e),
    }
}

pub async fn delete_doctor(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let doctor = match load_owned(&services, &user, &id).await {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    match services.doctors.delete_doctor(doctor.id).await {
        Ok(()) => {
            tracing::info!(doctor_id = %doctor.id, "doctor deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::repo_error_to_response(e),
    }
}
