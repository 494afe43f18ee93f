use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use caremap_auth::{TokenKind, TokenValidator};

use crate::app::errors;
use crate::context::AuthedUser;

#[derive(Clone)]
pub struct AuthState {
    pub validator: Arc<dyn TokenValidator>,
}

/// Require a valid bearer access token and attach the authenticated user to
/// the request.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let claims = match state.validator.validate(&token, TokenKind::Access, Utc::now()) {
        Ok(c) => c,
        Err(_) => {
            return errors::json_error(StatusCode::UNAUTHORIZED, "Token is invalid or expired");
        }
    };

    req.extensions_mut().insert(AuthedUser {
        user_id: claims.sub,
        username: claims.username,
    });

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, Response> {
    let missing = || {
        errors::json_error(
            StatusCode::UNAUTHORIZED,
            "Authentication credentials were not provided.",
        )
    };

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let token = header.strip_prefix("Bearer ").ok_or_else(missing)?.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token.to_string())
}
