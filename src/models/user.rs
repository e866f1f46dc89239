//! # User and Applicant Records
//!
//! Raw rows of the `users` and `applicants` tables. These structs carry
//! credential material and must never be serialized to clients directly;
//! use the projections in [`super::projection`] instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Discriminant of the `users.type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "user_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Applicant,
    Recruiter,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    /// Password hash
    pub password: String,
    pub refresh_token: Option<String>,
    #[sqlx(rename = "type")]
    pub user_type: UserType,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub job_experience: Value,
    pub created_at: OffsetDateTime,
}

/// Job seeker profile, 1:1 with a [`User`] of type [`UserType::Applicant`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Applicant {
    pub id: i32,
    pub user_id: i32,
    pub resume: Option<String>,
    pub git_hub_link: Option<String>,
    /// Comma-delimited, see [`crate::utils::skills`]
    pub skills: String,
    pub projects_list: Value,
}

/// A user joined with its optional applicant profile.
#[derive(Debug, Clone)]
pub struct UserWithApplicant {
    pub user: User,
    pub applicant: Option<Applicant>,
}
