use std::sync::Arc;

use tracing::info;

use crate::services::{email::EmailService, jwt::JwtService};
use crate::store::{CandidateStore, PostStore};

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Data access for users, applicants, vacancies and applications.
    pub candidate_store: Arc<dyn CandidateStore>,
    /// Data access for posts, comments and tags.
    pub post_store: Arc<dyn PostStore>,
    /// The email service used to notify candidates.
    pub email_service: Arc<dyn EmailService>,
    /// JWT service for bearer token validation.
    pub jwt_service: JwtService,
    /// Base URL of the public site, used for links in emails.
    pub frontend_url: String,
}

impl AppState {
    /// Creates a new application state with the provided services.
    pub fn new(
        candidate_store: Arc<dyn CandidateStore>,
        post_store: Arc<dyn PostStore>,
        email_service: Arc<dyn EmailService>,
        jwt_service: JwtService,
        frontend_url: String,
    ) -> Self {
        info!(%frontend_url, "Initializing application state");

        Self {
            candidate_store,
            post_store,
            email_service,
            jwt_service,
            frontend_url,
        }
    }
}
