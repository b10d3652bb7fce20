use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::DatabaseError;

/// Token claims; `sub` carries the user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Upper bound on token lifetime (10 years)
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365 * 10;

impl Claims {
    /// Lifetimes above `MAX_EXPIRY_HOURS` are clamped
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        // MAX_EXPIRY_HOURS fits in i64
        let hours = expiry_hours.min(MAX_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Why a request could not be mapped to a user
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use Bearer token format")]
    InvalidFormat,
    #[error("Empty JWT token")]
    EmptyToken,
    #[error("JWT secret not configured")]
    SecretNotConfigured,
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Unknown user: {0}")]
    UnknownUser(Uuid),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Extract the token from a `Bearer <token>` header value
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let auth_str = header.ok_or(AuthError::MissingHeader)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(token)
}

/// Validate JWT token and extract claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::SecretNotConfigured);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Header value to claims in one step
pub fn claims_from_header(header: Option<&str>, secret: &str) -> Result<Claims, AuthError> {
    let token = extract_bearer(header)?;
    validate_jwt(token, secret)
}
