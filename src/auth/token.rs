//! JWT token generation and validation
//!
//! Two token classes, each signed with its own HS256 secret:
//! - Access tokens: short-lived, carry id/username/email/fullname
//! - Refresh tokens: long-lived, carry the user id only
//!
//! The currently valid refresh token is also persisted on the user row;
//! a refresh presenting a token that no longer matches the stored value
//! is rejected, which catches reuse after rotation.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::data::User;
use crate::error::AppError;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub email: String,
    pub fullname: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Refresh token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// An access/refresh token pair issued at login or refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a fresh token pair for a user.
pub fn issue_token_pair(user: &User, auth: &AuthConfig) -> Result<TokenPair, AppError> {
    let now = Utc::now();

    let access_claims = AccessClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        fullname: user.full_name.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(auth.access_token_max_age)).timestamp(),
    };
    let access_token = encode(
        &Header::default(),
        &access_claims,
        &EncodingKey::from_secret(auth.access_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign access token: {}", e)))?;

    let refresh_claims = RefreshClaims {
        sub: user.id.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(auth.refresh_token_max_age)).timestamp(),
    };
    let refresh_token = encode(
        &Header::default(),
        &refresh_claims,
        &EncodingKey::from_secret(auth.refresh_token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign refresh token: {}", e)))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify an access token's signature and expiry.
///
/// # Errors
/// `AppError::Unauthorized` on any verification failure.
pub fn verify_access_token(token: &str, auth: &AuthConfig) -> Result<AccessClaims, AppError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(auth.access_token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Verify a refresh token's signature and expiry.
///
/// # Errors
/// `AppError::Unauthorized` on any verification failure.
pub fn verify_refresh_token(token: &str, auth: &AuthConfig) -> Result<RefreshClaims, AppError> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(auth.refresh_token_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}
