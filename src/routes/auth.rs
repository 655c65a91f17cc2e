use crate::{
    auth::{
        hash_password, issue_token, verify_password, AuthResponse, CurrentUser, LoginRequest,
        RegisterRequest,
    },
    config::Config,
    error::AppError,
    models::PublicUser,
    store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates an account and returns a bearer token so the client is signed in
/// immediately. Fails with 400 when the email (case-insensitively) or the
/// username (case-sensitively) is already taken, naming the colliding field.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let email = register_data.email.trim().to_lowercase();

    if let Some(existing) =
        store::users::find_conflict(&pool, &register_data.username, &email).await?
    {
        let message = if existing.email == email {
            "Email already in use"
        } else {
            "Username already in use"
        };
        return Err(AppError::Conflict(message.into()));
    }

    let password_hash = hash_password(&register_data.password)?;
    let user = store::users::create(&pool, &register_data.username, &email, &password_hash).await?;
    let token = issue_token(user.id, config.token_secret.as_bytes())?;

    log::info!("registered user {}", user.username);

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "Registration successful".into(),
        token,
        user: PublicUser::from(&user),
    }))
}

/// Login user
///
/// Authenticates by email and password and returns a fresh bearer token.
/// Unknown email and wrong password produce the same 401 response.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let email = login_data.email.trim().to_lowercase();
    let user = store::users::find_by_email(&pool, &email).await?;

    match user {
        Some(user) => {
            if verify_password(&login_data.password, &user.password_hash)? {
                let token = issue_token(user.id, config.token_secret.as_bytes())?;
                Ok(HttpResponse::Ok().json(AuthResponse {
                    success: true,
                    message: "Login successful".into(),
                    token,
                    user: PublicUser::from(&user),
                }))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Resolve the caller's identity from their token.
#[get("/me")]
pub async fn me(user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": PublicUser::from(&user.0),
    })))
}
