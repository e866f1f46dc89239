//! # JWT Service
//!
//! Bearer token handling for the protected routes. Tokens are HS256 JWTs whose
//! `sub` claim is the numeric user id. Token issuance for end users (login,
//! refresh) belongs to the identity service; [`JwtService::issue_access_token`]
//! exists for operator tooling and tests.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::utils::constant::ACCESS_TOKEN_EXPIRY;

/// Errors that can occur during JWT operations
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// JWT claims structure for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id as string)
    pub sub: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        Self {
            encoding_key,
            decoding_key,
        }
    }

    /// Builds both keys from one shared HS256 secret.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
        )
    }

    /// Signs a short-lived access token for `user_id`.
    #[instrument(skip(self))]
    pub fn issue_access_token(&self, user_id: i32) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::InvalidToken)?
            .as_secs();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + ACCESS_TOKEN_EXPIRY.as_secs(),
            iat: now,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        trace!("Access token issued");
        Ok(token)
    }

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(user_id = %token_data.claims.sub, "Access token validated");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Access token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid access token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}
