//! # Email Service
//!
//! Outbound transactional mail. The [`EmailService`] trait is the only thing
//! the rest of the application sees, so tests can swap in a recording mock.
//!
//! ## Implementations
//!
//! - [`LogEmailer`] - Development implementation that writes the message to the log
//! - [`ExternalEmailer`] - Production implementation posting to a mail provider's HTTP API
//!
//! The implementation is chosen from [`crate::utils::config::Config`]: production
//! requires a [`MailConfig`], every other environment falls back to [`LogEmailer`].

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::utils::config::MailConfig;
use crate::utils::constant::MAIL_SEND_TIMEOUT;

/// Errors that can occur during email operations
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Email provider did not respond in time")]
    Timeout,
}

/// Trait for email sending services
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends an HTML email to a single recipient.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::SendFailed`] if the provider rejects the message
    /// or cannot be reached.
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError>;
}

/// Mock email service for development
///
/// Nothing leaves the process; the message is recorded in the log instead.
pub struct LogEmailer;

#[async_trait]
impl EmailService for LogEmailer {
    #[instrument(skip(self, body_html), fields(recipient = %recipient, subject = %subject))]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        info!(body = %body_html, "Mock email sent");
        Ok(())
    }
}

/// Email service backed by an external provider API
///
/// Messages are posted as JSON and authenticated with the configured API key.
pub struct ExternalEmailer {
    config: MailConfig,
    http_client: reqwest::Client,
}

impl ExternalEmailer {
    pub fn new(config: MailConfig) -> Self {
        info!(
            api_url = %config.api_url,
            sender_email = %config.sender_email,
            "Initializing external email service"
        );

        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailService for ExternalEmailer {
    #[instrument(
        skip(self, body_html),
        fields(
            recipient = %recipient,
            subject = %subject,
            sender = %self.config.sender_email
        )
    )]
    async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body_html: &str,
    ) -> Result<(), EmailError> {
        let payload = json!({
            "to": recipient,
            "from": self.config.sender_email,
            "subject": subject,
            "content": [{ "type": "text/html", "value": body_html }]
        });

        debug!("Posting message to mail provider");
        let response = self
            .http_client
            .post(&self.config.api_url)
            .basic_auth("api", Some(&self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Mail provider unreachable");
                EmailError::SendFailed(format!("Network request error: {e}"))
            })?;

        let status = response.status();
        if status.is_success() {
            info!("Email accepted by mail provider");
            return Ok(());
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        error!(%status, %error_body, "Mail provider rejected message");

        Err(EmailError::SendFailed(format!(
            "Mail provider responded with {status}"
        )))
    }
}

/// Sends an email, giving up after [`MAIL_SEND_TIMEOUT`].
pub async fn send_with_timeout(
    service: &dyn EmailService,
    recipient: &str,
    subject: &str,
    body_html: &str,
) -> Result<(), EmailError> {
    match tokio::time::timeout(
        MAIL_SEND_TIMEOUT,
        service.send_email(recipient, subject, body_html),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(%recipient, "Email send timed out");
            Err(EmailError::Timeout)
        }
    }
}
