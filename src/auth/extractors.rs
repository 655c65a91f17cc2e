use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// Extracts the authenticated caller from request extensions.
///
/// Intended for routes behind `AuthGuard`, which validates the bearer token,
/// resolves the user, and inserts it into extensions. If no user is present
/// the guard did not run, and the request is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError; // AppError converts via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(CurrentUser(user))),
            None => {
                let err = AppError::Unauthorized(
                    "User not found in request. Ensure AuthGuard is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
