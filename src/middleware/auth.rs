//! # Authentication Middleware
//!
//! Validates `Authorization: Bearer <jwt>` headers and exposes the caller as
//! [`AuthUser`] to protected handlers. Being authenticated is the only
//! requirement; there are no roles or per-resource permissions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::models::AppState;
use crate::services::jwt::Claims;

/// Authentication middleware for protecting routes
///
/// # Returns
///
/// - **Success**: Continues to next handler with [`AuthUser`] in request extensions
/// - **Failure**: Returns `401 Unauthorized` for missing, malformed or invalid tokens
#[instrument(
    skip_all,
    fields(
        method = %req.method(),
        uri = %req.uri(),
    )
)]
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
    else {
        warn!("Missing or malformed Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = state.jwt_service.validate_access_token(token).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        StatusCode::UNAUTHORIZED
    })?;

    let user_id = claims.sub.parse::<i32>().map_err(|e| {
        warn!(error = %e, "Token subject is not a user id");
        StatusCode::UNAUTHORIZED
    })?;

    debug!(user_id, "Authentication successful");
    req.extensions_mut().insert(AuthUser { user_id, claims });

    Ok(next.run(req).await)
}

/// Authenticated caller, available to handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    /// JWT claims containing additional token metadata
    pub claims: Claims,
}
