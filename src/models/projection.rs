//! # Candidate Projections
//!
//! Public-safe views of user and applicant records. The projection types have
//! no field for the password hash, the refresh token or the user type, so a
//! serialized projection cannot leak them whatever the input record holds.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use super::application::{ApplicationRecord, ApplicationStatus};
use super::user::{Applicant, User, UserWithApplicant};
use crate::utils::skills::{self, SkillOption};

/// Candidate as returned by the search, list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub job_experience: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub git_hub_link: Option<String>,
    pub skills: Vec<SkillOption>,
}

impl CandidateProfile {
    pub fn project(user: User, applicant: Option<Applicant>) -> Self {
        let (git_hub_link, skills) = match applicant {
            Some(applicant) => (applicant.git_hub_link, skills::decode(Some(&applicant.skills))),
            None => (None, Vec::new()),
        };

        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            patronymic: user.patronymic,
            avatar: user.avatar,
            about: user.about,
            job_experience: user.job_experience,
            created_at: user.created_at,
            git_hub_link,
            skills,
        }
    }
}

impl From<UserWithApplicant> for CandidateProfile {
    fn from(record: UserWithApplicant) -> Self {
        Self::project(record.user, record.applicant)
    }
}

/// Candidate as listed in the feedback view of a vacancy.
///
/// `id` is the user id; the applicant's own id and user id are not exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackCandidate {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub avatar: Option<String>,
    pub about: Option<String>,
    pub job_experience: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub resume: Option<String>,
    pub git_hub_link: Option<String>,
    pub projects_list: Value,
    pub skills: Vec<SkillOption>,
    pub status: ApplicationStatus,
}

impl FeedbackCandidate {
    pub fn project(user: User, applicant: Applicant, status: ApplicationStatus) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            patronymic: user.patronymic,
            avatar: user.avatar,
            about: user.about,
            job_experience: user.job_experience,
            created_at: user.created_at,
            skills: skills::decode(Some(&applicant.skills)),
            resume: applicant.resume,
            git_hub_link: applicant.git_hub_link,
            projects_list: applicant.projects_list,
            status,
        }
    }
}

impl From<ApplicationRecord> for FeedbackCandidate {
    fn from(record: ApplicationRecord) -> Self {
        Self::project(record.user, record.applicant, record.application.status)
    }
}
