//! # Application Constants
//!
//! This module defines configuration constants used throughout the application.
//! These constants control timeouts for external calls, token lifetimes and
//! fixed texts of outbound notifications.

use std::time::Duration;

/// Upper bound for a single data store round trip
///
/// Calls exceeding this are reported as `503 Service Unavailable`.
pub const STORE_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for a single outbound mail request
pub const MAIL_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Expiration time for JWT access tokens issued by [`crate::services::jwt::JwtService`]
pub const ACCESS_TOKEN_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Separator used by the stored skills string
pub const SKILLS_DELIMITER: &str = ",";

/// Subject line of the application status notification
pub const STATUS_EMAIL_SUBJECT: &str = "Vacancy status";

/// Public site used to build links inside notification emails
pub const DEFAULT_FRONTEND_URL: &str = "https://hackaton-404.ru";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8090";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// How long to wait for a free pool connection before giving up
pub const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);
