pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PublicUser;

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthGuard;
pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, Claims};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[validate(email)]
    pub email: String,
    /// User's password, at least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username: 3-20 characters, alphanumeric plus underscores and
    /// hyphens. Uniqueness is case-sensitive.
    #[validate(
        length(min = 3, max = 20),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Email address, stored case-folded; uniqueness is case-insensitive.
    #[validate(email)]
    pub email: String,
    /// Password, at least 6 characters. Only the bcrypt hash is persisted.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response body for successful registration and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    /// Signed bearer token for subsequent requests.
    pub token: String,
    pub user: PublicUser,
}
