use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::store;

/// Middleware gating every `/api` endpoint except registration and login.
///
/// Each request walks the full chain: bearer token extraction, signature and
/// expiry verification, then resolution of the token's subject against the
/// credential store. Only a token that still maps to an existing user reaches
/// the inner service; the resolved `User` is attached to request extensions
/// for the `CurrentUser` extractor.
pub struct AuthGuard;

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthGuardService<S> {
    // Rc because the user lookup keeps the future alive past `call`.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Registration and login are the only ungated endpoints in the scope.
        let path = req.path();
        if path == "/api/auth/register" || path == "/api/auth/login" {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let claims = {
                let token = req
                    .headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .ok_or_else(|| AppError::Unauthorized("Access token required".into()))?;

                let config = req
                    .app_data::<web::Data<Config>>()
                    .ok_or_else(|| AppError::Internal("Config not attached to app".into()))?;
                verify_token(token, config.token_secret.as_bytes())?
            };

            let user = {
                let pool = req
                    .app_data::<web::Data<PgPool>>()
                    .ok_or_else(|| AppError::Internal("Database pool not attached to app".into()))?;
                // A token whose subject no longer exists is as good as no token.
                store::users::find_by_id(pool.get_ref(), claims.sub)
                    .await?
                    .ok_or_else(|| AppError::Unauthorized("Invalid access token".into()))?
            };

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
