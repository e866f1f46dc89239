use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::user::{Applicant, User};

/// Status of an application, mirrors the `application_status` enum in PostgreSQL.
///
/// Transitions are not constrained: any status may be set from any other,
/// including moving an approved application back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "application_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status `{s}`"))
    }
}

/// `filterBy` query value of the feedback listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum FeedbackFilter {
    #[default]
    All,
    Status(ApplicationStatus),
}

impl FeedbackFilter {
    pub fn status(&self) -> Option<ApplicationStatus> {
        match self {
            FeedbackFilter::All => None,
            FeedbackFilter::Status(status) => Some(*status),
        }
    }
}

impl TryFrom<String> for FeedbackFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "ALL" {
            Ok(FeedbackFilter::All)
        } else {
            value.parse().map(FeedbackFilter::Status)
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Application {
    pub id: i32,
    pub applicant_id: i32,
    pub vacancy_id: i32,
    pub status: ApplicationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One application of a vacancy together with the applicant and its user.
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub application: Application,
    pub applicant: Applicant,
    pub user: User,
}
