//! # Talentboard - Recruiting Platform Backend
//!
//! ## Modules
//!
//! - [`handlers`] - HTTP request handlers for various endpoints
//! - [`middleware`] - Bearer token authentication
//! - [`models`] - Records, projections and shared state
//! - [`services`] - Business logic (candidates, notifications, posts, email, JWT)
//! - [`store`] - Data access traits and the PostgreSQL implementation
//! - [`utils`] - Configuration, constants and the skills codec

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::*;
use crate::middleware::auth_middleware;
use crate::models::AppState;
use crate::services::email::{EmailService, ExternalEmailer, LogEmailer};
use crate::services::jwt::JwtService;
use crate::store::PgStore;
use crate::utils::config::Config;

/// Creates the production router backed by PostgreSQL.
///
/// The email service is [`ExternalEmailer`] when the configuration carries
/// mail credentials (production) and [`LogEmailer`] otherwise.
pub fn app(db_pool: PgPool, config: &Config) -> Router {
    let email_service: Arc<dyn EmailService> = match &config.mail {
        Some(mail) => {
            info!("Running in production mode with [ExternalEmailer]");
            Arc::new(ExternalEmailer::new(mail.clone()))
        }
        None => {
            info!("Running in development mode with [LogEmailer (Mock)]");
            Arc::new(LogEmailer)
        }
    };

    let store = Arc::new(PgStore::new(db_pool));

    let state = AppState::new(
        store.clone(),
        store,
        email_service,
        JwtService::from_secret(config.jwt_secret.as_bytes()),
        config.frontend_url.clone(),
    );

    router(state)
}

/// Builds the route table around an already assembled [`AppState`].
///
/// Candidate routes live under `/candidates` and all require a bearer token.
/// Post routes live under `/posts`; reads are public, writes are protected.
pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);
    let auth = from_fn_with_state(Arc::clone(&state), auth_middleware);

    let candidate_routes = Router::new()
        .route("/", get(list_candidates))
        .route("/search", get(search_candidates))
        .route("/send-email", post(send_status_email))
        .route(
            "/candidates-feedback/{vacancy_id}",
            get(list_feedback).patch(update_feedback_status),
        )
        .route("/{id}", get(get_candidate))
        .route_layer(auth.clone());

    let public_post_routes = Router::new()
        .route("/", get(list_posts))
        .route("/comments", get(list_posts_with_comments))
        .route("/search", get(search_posts))
        .route("/by-tags", get(posts_by_tags))
        .route("/{id}", get(get_post));

    let protected_post_routes = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route_layer(auth);

    Router::new()
        .route("/health-check", get(health_check))
        .nest("/candidates", candidate_routes)
        .nest("/posts", public_post_routes.merge(protected_post_routes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
