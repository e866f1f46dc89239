//! # Health Check Handler
//!
//! Liveness check for load balancers and deployment tooling. It does not
//! touch the database or the mail provider.

use axum::http::StatusCode;
use tracing::{instrument, trace};

/// GET /health-check
///
/// Always returns `200 OK` with an empty body.
#[instrument]
pub async fn health_check() -> StatusCode {
    trace!("Health check");
    StatusCode::OK
}
