//! Registration, login and token refresh.
//!
//! These are the only unauthenticated routes.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use caremap_auth::RegisterDraft;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterDraft>,
) -> axum::response::Response {
    let user = match body.into_user(Utc::now()) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.users.insert_user(user).await {
        Ok(u) => u,
        Err(e) => return errors::repo_error_to_response(e),
    };

    tracing::info!(user_id = %user.id, "user registered");
    (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let rejected = || {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "No active account found with the given credentials",
        )
    };

    let user = match services.users.find_user_by_username(&body.username).await {
        Ok(Some(u)) => u,
        Ok(None) => return rejected(),
        Err(e) => return errors::repo_error_to_response(e),
    };

    if !user.verify_password(&body.password) {
        return rejected();
    }

    match services.tokens.issue_pair(user.id, &user.username, Utc::now()) {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(_) => rejected(),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshRequest>,
) -> axum::response::Response {
    match services.tokens.refresh_access(&body.refresh, Utc::now()) {
        Ok(access) => (
            StatusCode::OK,
            Json(serde_json::json!({ "access": access })),
        )
            .into_response(),
        Err(_) => errors::json_error(StatusCode::UNAUTHORIZED, "Token is invalid or expired"),
    }
}
