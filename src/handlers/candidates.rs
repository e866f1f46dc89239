//! # Candidate Handlers
//!
//! Search, listing and detail view of applicants. All routes here sit behind
//! the authentication middleware.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppResult;
use crate::models::{AppState, CandidateProfile};
use crate::services::candidates::CandidateService;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_query: Option<String>,
}

/// Searches applicants by skill.
///
/// GET /candidates/search?searchQuery=go
///
/// # Returns
///
/// - `200 OK` with the matching candidates (every applicant for a blank query)
/// - `503 Service Unavailable` - Database unreachable or too slow
#[instrument(
    skip_all,
    fields(
        query = ?params.search_query,
        request_id = %uuid::Uuid::new_v4()
    )
)]
pub async fn search_candidates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<CandidateProfile>>> {
    let query = params.search_query.unwrap_or_default();
    let candidates = CandidateService::search(state.candidate_store.as_ref(), &query).await?;
    Ok(Json(candidates))
}

/// Lists all applicants.
///
/// GET /candidates
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn list_candidates(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CandidateProfile>>> {
    let candidates = CandidateService::list(state.candidate_store.as_ref()).await?;
    Ok(Json(candidates))
}

/// Gets a single applicant.
///
/// GET /candidates/{id}
///
/// # Returns
///
/// - `200 OK` with the candidate
/// - `400 Bad Request` - Id is not a number
/// - `404 Not Found` - No applicant with this id
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn get_candidate(
    State(state): State<Arc<AppState>>,
    user_id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<CandidateProfile>> {
    let Path(user_id) = user_id?;
    let candidate = CandidateService::get(state.candidate_store.as_ref(), user_id).await?;
    Ok(Json(candidate))
}
