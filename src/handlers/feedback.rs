//! # Feedback Handlers
//!
//! Recruiter-side view of a vacancy's applications, the bulk status update
//! and the candidate notification email.
//!
//! The status update and the email are separate calls by default. A client
//! may pass `"notify": true` with the update to have the email sent in the
//! same request; a failed email is reported in the response but never undoes
//! the update.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::AppResult;
use crate::models::{AppState, ApplicationStatus, FeedbackCandidate, FeedbackFilter};
use crate::services::candidates::CandidateService;
use crate::services::notification::NotificationService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackParams {
    /// Missing means [`FeedbackFilter::All`]
    pub filter_by: Option<FeedbackFilter>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub user_id: i32,
    pub status: ApplicationStatus,
    /// Also email the candidate after a successful update
    #[serde(default)]
    pub notify: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub status: ApplicationStatus,
    /// Only present when a notification was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub user_id: i32,
    pub status: ApplicationStatus,
    pub vacancy_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Lists the candidates who applied to a vacancy.
///
/// GET /candidates/candidates-feedback/{vacancyId}?filterBy=ALL|PENDING|APPROVED|REJECTED
///
/// # Returns
///
/// - `200 OK` with the candidates and their application status
/// - `400 Bad Request` - Unknown `filterBy` value or non-numeric vacancy id
/// - `404 Not Found` - Vacancy does not exist
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_feedback(
    State(state): State<Arc<AppState>>,
    vacancy_id: Result<Path<i32>, PathRejection>,
    params: Result<Query<FeedbackParams>, QueryRejection>,
) -> AppResult<Json<Vec<FeedbackCandidate>>> {
    let Path(vacancy_id) = vacancy_id?;
    let Query(params) = params?;
    let filter = params.filter_by.unwrap_or_default();

    let candidates =
        CandidateService::list_feedback(state.candidate_store.as_ref(), vacancy_id, filter).await?;
    Ok(Json(candidates))
}

/// Sets the status of all of a candidate's applications to a vacancy.
///
/// PATCH /candidates/candidates-feedback/{vacancyId}
///
/// # Returns
///
/// - `200 OK` with `{ "status": ... }`
/// - `400 Bad Request` - Malformed body or unknown status
/// - `404 Not Found` - User missing or not an applicant
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn update_feedback_status(
    State(state): State<Arc<AppState>>,
    vacancy_id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> AppResult<Json<UpdateStatusResponse>> {
    let Path(vacancy_id) = vacancy_id?;
    let Json(request) = payload?;

    let status = CandidateService::update_status(
        state.candidate_store.as_ref(),
        request.user_id,
        vacancy_id,
        request.status,
    )
    .await?;

    let notified = if request.notify {
        Some(
            NotificationService::notify_best_effort(
                state.candidate_store.as_ref(),
                state.email_service.as_ref(),
                &state.frontend_url,
                request.user_id,
                vacancy_id,
                status,
            )
            .await,
        )
    } else {
        None
    };

    Ok(Json(UpdateStatusResponse { status, notified }))
}

/// Emails a candidate the decision on their application.
///
/// POST /candidates/send-email
///
/// # Returns
///
/// - `200 OK` - Email handed to the mail provider
/// - `404 Not Found` - User does not exist
/// - `502 Bad Gateway` - Mail provider rejected the message
/// - `503 Service Unavailable` - Mail provider or database timed out
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn send_status_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(request) = payload?;

    NotificationService::notify(
        state.candidate_store.as_ref(),
        state.email_service.as_ref(),
        &state.frontend_url,
        request.user_id,
        request.vacancy_id,
        request.status,
    )
    .await?;

    info!(user_id = request.user_id, "Status email sent");
    Ok(Json(MessageResponse {
        message: "Email sent".to_string(),
    }))
}
