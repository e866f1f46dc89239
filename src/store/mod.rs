//! # Data Access
//!
//! Handlers and services never touch the database directly. They go through
//! the [`CandidateStore`] and [`PostStore`] traits, which are injected into
//! [`crate::models::AppState`] at construction time. [`PgStore`] is the
//! PostgreSQL implementation used in production.

mod postgres;

use std::future::Future;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ApplicationRecord, ApplicationStatus, Post, PostChanges, PostDetail, PostWithComments,
    PostWithTags, UserWithApplicant,
};
use crate::utils::constant::STORE_CALL_TIMEOUT;

pub use postgres::PgStore;

/// Errors that can occur while talking to the data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("data store call timed out")]
    Timeout,
}

/// Users, applicants, vacancies and their applications.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// All users of type `APPLICANT`, ordered by id.
    async fn list_applicants(&self) -> Result<Vec<UserWithApplicant>, StoreError>;

    /// Applicants whose skills contain `skill` exactly (no substring or case folding).
    async fn find_applicants_with_skill(
        &self,
        skill: &str,
    ) -> Result<Vec<UserWithApplicant>, StoreError>;

    /// The user with this id, only if it is of type `APPLICANT`.
    async fn find_applicant(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError>;

    /// The user with this id regardless of type, with its applicant profile if any.
    async fn find_user(&self, user_id: i32) -> Result<Option<UserWithApplicant>, StoreError>;

    /// Applications of a vacancy, optionally restricted to one status, ordered by
    /// application id. Returns `None` when the vacancy does not exist.
    async fn list_applications(
        &self,
        vacancy_id: i32,
        status: Option<ApplicationStatus>,
    ) -> Result<Option<Vec<ApplicationRecord>>, StoreError>;

    /// Sets `status` on every application of `applicant_id` to `vacancy_id`
    /// in one statement. Returns the number of rows changed.
    async fn update_application_status(
        &self,
        applicant_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> Result<u64, StoreError>;
}

/// Posts, comments and tags.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first, with their tags.
    async fn list_posts(&self) -> Result<Vec<PostWithTags>, StoreError>;

    async fn list_posts_with_comments(&self) -> Result<Vec<PostWithComments>, StoreError>;

    /// Posts whose title or content contains `query`, ignoring case.
    async fn search_posts(&self, query: &str) -> Result<Vec<PostWithTags>, StoreError>;

    /// Posts carrying at least one of the named tags.
    async fn posts_by_tags(&self, tags: &[String]) -> Result<Vec<PostWithTags>, StoreError>;

    async fn get_post(&self, post_id: i32) -> Result<Option<PostDetail>, StoreError>;

    /// Creates a post owned by `user_id`. Tags are looked up by name and
    /// created when missing.
    async fn create_post(
        &self,
        user_id: i32,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<PostWithTags, StoreError>;

    async fn update_post(
        &self,
        post_id: i32,
        changes: &PostChanges,
    ) -> Result<Option<Post>, StoreError>;

    async fn delete_post(&self, post_id: i32) -> Result<Option<Post>, StoreError>;
}

/// Bounds a store call by [`STORE_CALL_TIMEOUT`].
pub async fn timed<T, F>(call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(STORE_CALL_TIMEOUT, call)
        .await
        .map_err(|_| StoreError::Timeout)?
}
