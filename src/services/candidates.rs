//! # Candidate Service
//!
//! Candidate search and listing, the per-vacancy feedback view and the bulk
//! application status update. All reads are projected through
//! [`CandidateProfile`] or [`FeedbackCandidate`] before leaving this module.

use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::{
    ApplicationStatus, CandidateProfile, FeedbackCandidate, FeedbackFilter,
};
use crate::store::{CandidateStore, timed};

pub struct CandidateService;

impl CandidateService {
    /// Finds applicants having the queried skill.
    ///
    /// Only the first character of the query is upper-cased before an exact
    /// match against the stored skills, so `go` finds `Go` but `rust` does not
    /// find `RUST` and `Ru` does not find `Rust`. A blank query lists every applicant.
    #[instrument(skip(store))]
    pub async fn search(
        store: &dyn CandidateStore,
        query: &str,
    ) -> AppResult<Vec<CandidateProfile>> {
        let records = match normalize_search_query(query) {
            Some(skill) => {
                debug!(%skill, "Searching applicants by skill");
                timed(store.find_applicants_with_skill(&skill)).await?
            }
            None => {
                debug!("Blank search query, listing all applicants");
                timed(store.list_applicants()).await?
            }
        };

        info!(count = records.len(), "Candidate search completed");
        Ok(records.into_iter().map(CandidateProfile::from).collect())
    }

    #[instrument(skip(store))]
    pub async fn list(store: &dyn CandidateStore) -> AppResult<Vec<CandidateProfile>> {
        let records = timed(store.list_applicants()).await?;
        Ok(records.into_iter().map(CandidateProfile::from).collect())
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn CandidateStore, user_id: i32) -> AppResult<CandidateProfile> {
        match timed(store.find_applicant(user_id)).await? {
            Some(record) => Ok(record.into()),
            None => {
                warn!("Candidate not found");
                Err(AppError::NotFound("User not found"))
            }
        }
    }

    /// Lists the candidates who applied to a vacancy, optionally only those
    /// whose application has a given status.
    #[instrument(skip(store))]
    pub async fn list_feedback(
        store: &dyn CandidateStore,
        vacancy_id: i32,
        filter: FeedbackFilter,
    ) -> AppResult<Vec<FeedbackCandidate>> {
        let Some(records) = timed(store.list_applications(vacancy_id, filter.status())).await?
        else {
            warn!("Vacancy not found");
            return Err(AppError::NotFound("Vacancy not found"));
        };

        debug!(count = records.len(), "Loaded vacancy applications");
        Ok(records.into_iter().map(FeedbackCandidate::from).collect())
    }

    /// Sets `status` on every application the user has made to the vacancy.
    ///
    /// The user must exist and have an applicant profile. Any status may be
    /// applied regardless of the current one. Returns the applied status.
    #[instrument(skip(store))]
    pub async fn update_status(
        store: &dyn CandidateStore,
        user_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> AppResult<ApplicationStatus> {
        let applicant = timed(store.find_user(user_id))
            .await?
            .and_then(|record| record.applicant);

        let Some(applicant) = applicant else {
            warn!("User not found or has no applicant profile");
            return Err(AppError::NotFound("User not found"));
        };

        let updated =
            timed(store.update_application_status(applicant.id, vacancy_id, status)).await?;

        info!(rows = updated, %status, "Application status updated");
        Ok(status)
    }
}

/// Upper-cases the first character of a search query and leaves the rest
/// untouched, surrounding whitespace included. Returns `None` for a blank query.
pub fn normalize_search_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        return None;
    }

    let mut chars = query.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
