use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tokens are valid for seven days; there is no refresh mechanism, clients
/// re-authenticate after expiry.
const TOKEN_TTL_DAYS: i64 = 7;

/// Claims encoded within a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's unique identifier.
    pub sub: Uuid,
    /// Issuance timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues a signed token binding `user_id` for the next seven days.
///
/// The signing secret comes from [`crate::config::Config`]; callers never
/// read it from the environment directly.
pub fn issue_token(user_id: Uuid, secret: &[u8]) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::days(TOKEN_TTL_DAYS))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

/// Verifies a token's signature and expiry and decodes its claims.
///
/// Failures map onto the auth taxonomy via `From<jsonwebtoken::errors::Error>`:
/// expired, invalid signature, or malformed — all HTTP 401.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map(|data| data.claims)
        .map_err(AppError::from)
}
