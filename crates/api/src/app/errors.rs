//! Consistent JSON error responses.
//!
//! Bodies follow two shapes: `{"error": "<message>"}` for single-message
//! failures, and `{"error": {"<field>": ["<message>", ...]}}` for field-level
//! validation failures.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use caremap_core::{DomainError, FieldErrors};
use caremap_infra::RepoError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

/// 400 with field-level detail.
pub fn validation_error(errors: &FieldErrors) -> axum::response::Response {
    let mut fields = serde_json::Map::new();
    for e in errors.iter() {
        let entry = fields.entry(e.field.to_string()).or_insert_with(|| json!([]));
        if let Some(messages) = entry.as_array_mut() {
            messages.push(json!(e.message));
        }
    }

    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "error": fields })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(errors) => validation_error(&errors),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid id"),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        DomainError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden"),
        DomainError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, msg),
    }
}

pub fn repo_error_to_response(err: RepoError) -> axum::response::Response {
    match err {
        // The mapping-pair constraint is not a field of the request body;
        // surface it as a single message like the other mapping rules.
        RepoError::Duplicate { field: "mapping", message } => {
            json_error(StatusCode::BAD_REQUEST, message)
        }
        RepoError::Duplicate { field, message } => {
            let mut errors = FieldErrors::new();
            errors.push(field, message);
            validation_error(&errors)
        }
        RepoError::NotFound => json_error(StatusCode::NOT_FOUND, "not found"),
        RepoError::Storage(detail) => {
            tracing::error!(%detail, "repository failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
