//! Credential store: exact-match lookups and creation of user records.
//! Passwords arrive here already hashed; plaintext never touches this module.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let sql = format!(
        "INSERT INTO users (username, email, password_hash)
         VALUES ($1, $2, $3)
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

/// Email lookup is case-insensitive; addresses are stored case-folded.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE email = LOWER($1)", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Duplicate probe for registration: email collides case-insensitively,
/// username case-sensitively. Returns the colliding record so the caller can
/// report which field was taken.
pub async fn find_conflict(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<User>, AppError> {
    let sql = format!(
        "SELECT {} FROM users WHERE email = LOWER($1) OR username = $2 LIMIT 1",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}
