//! # Runtime Configuration
//!
//! Configuration is read once at startup from environment variables (a `.env`
//! file is loaded by `main` through `dotenvy`). Secrets may alternatively be
//! provided as files via the `*_FILE` variants, see [`get_secret`].

use std::env;

use thiserror::Error;

use crate::utils::constant::*;
use crate::utils::secret::get_secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env variable `{0}` should be set")]
    Missing(&'static str),
    #[error("env variable `{0}` is not valid: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
}

impl AppEnv {
    /// Reads `APP_ENV`; anything other than "production" is development.
    pub fn from_env() -> Self {
        match env::var("APP_ENV") {
            Ok(raw) if raw.eq_ignore_ascii_case("production") => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }
}

/// Credentials of the external transactional mail API
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender_email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub database_url: String,
    pub jwt_secret: String,
    /// Only present in production; development logs emails instead.
    pub mail: Option<MailConfig>,
    pub frontend_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `APP_ENV` - "production" enables the external mailer, anything else logs emails
    /// - `DATABASE_URL` / `DATABASE_URL_FILE` - PostgreSQL connection string
    /// - `JWT_SECRET` / `JWT_SECRET_FILE` - HS256 key for bearer tokens
    /// - `MAIL_API_URL`, `MAIL_API_KEY` (or `MAIL_API_KEY_FILE`), `SENDER_EMAIL` - required in production
    /// - `FRONTEND_URL` - base of links in notification emails
    /// - `BIND_ADDR` - listen address, defaults to `0.0.0.0:8090`
    /// - `DB_MAX_CONNECTIONS` - pool size, defaults to 10
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = AppEnv::from_env();

        let database_url = get_secret("DATABASE_URL_FILE", "DATABASE_URL")
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret =
            get_secret("JWT_SECRET_FILE", "JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mail = if app_env == AppEnv::Production {
            Some(MailConfig {
                api_url: env::var("MAIL_API_URL").map_err(|_| ConfigError::Missing("MAIL_API_URL"))?,
                api_key: get_secret("MAIL_API_KEY_FILE", "MAIL_API_KEY")
                    .ok_or(ConfigError::Missing("MAIL_API_KEY"))?,
                sender_email: env::var("SENDER_EMAIL")
                    .map_err(|_| ConfigError::Missing("SENDER_EMAIL"))?,
            })
        } else {
            None
        };

        let frontend_url = env::var("FRONTEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid("DB_MAX_CONNECTIONS", e.to_string())
                })?,
            Err(_) => DEFAULT_DB_MAX_CONNECTIONS,
        };

        Ok(Self {
            app_env,
            database_url,
            jwt_secret,
            mail,
            frontend_url,
            bind_addr,
            db_max_connections,
        })
    }
}
