//! # Candidate Notifications
//!
//! Emails a candidate about a decision on their application. Sending is
//! independent of the status update itself: a failed email never undoes an
//! update that already happened.

use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::ApplicationStatus;
use crate::services::email::{EmailService, send_with_timeout};
use crate::store::{CandidateStore, timed};
use crate::utils::constant::STATUS_EMAIL_SUBJECT;

pub struct NotificationService;

impl NotificationService {
    /// Looks up the user and emails them the decision for `vacancy_id`.
    #[instrument(skip(store, email_service, frontend_url))]
    pub async fn notify(
        store: &dyn CandidateStore,
        email_service: &dyn EmailService,
        frontend_url: &str,
        user_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> AppResult<()> {
        let Some(record) = timed(store.find_user(user_id)).await? else {
            warn!("Notification target not found");
            return Err(AppError::NotFound("User not found"));
        };

        let body = render_status_message(frontend_url, vacancy_id, status);
        send_with_timeout(email_service, &record.user.email, STATUS_EMAIL_SUBJECT, &body).await?;

        info!("Status notification sent");
        Ok(())
    }

    /// Same as [`Self::notify`] but only reports whether the email went out.
    pub async fn notify_best_effort(
        store: &dyn CandidateStore,
        email_service: &dyn EmailService,
        frontend_url: &str,
        user_id: i32,
        vacancy_id: i32,
        status: ApplicationStatus,
    ) -> bool {
        match Self::notify(store, email_service, frontend_url, user_id, vacancy_id, status).await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, user_id, vacancy_id, "Candidate was not notified");
                false
            }
        }
    }
}

/// Renders the HTML notification. `APPROVED` reads as approved, every other
/// status as rejected.
pub fn render_status_message(
    frontend_url: &str,
    vacancy_id: i32,
    status: ApplicationStatus,
) -> String {
    let verdict = match status {
        ApplicationStatus::Approved => "одобрен",
        _ => "отклонен",
    };

    format!(
        r#"Твой отклик на <a href="{frontend_url}/vacancy/{vacancy_id}">вакансию</a> {verdict}"#
    )
}
