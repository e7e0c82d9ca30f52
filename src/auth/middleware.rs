use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::extractors::AuthSession;
use crate::auth::token::TokenKeys;
use crate::error::AppError;
use crate::models::User;

/// Authenticates requests by their `x-auth` header.
///
/// The presented token is resolved through [`User::find_by_token`], which
/// requires both a valid signature and live membership in the owner's stored
/// token list; a logged-out token is rejected even though its signature still
/// checks out. On success the resolved session is inserted into request
/// extensions for the [`AuthSession`] extractor.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    // Rc because the token lookup awaits the database inside the boxed
    // future, which needs its own handle on the inner service.
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        // Skip authentication for the health check, registration and login
        let path = req.path();
        if path == "/health"
            || path == "/users/login"
            || (path == "/users" && req.method() == Method::POST)
        {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("x-auth")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match token {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthorized("Missing token".into()).into());
                }
            };

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError(
                        "Database pool not configured".into(),
                    ))
                })?;
            let keys = req
                .app_data::<web::Data<TokenKeys>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError(
                        "Token keys not configured".into(),
                    ))
                })?;

            match User::find_by_token(pool.get_ref(), &keys, &token).await {
                Ok(user) => {
                    req.extensions_mut().insert(AuthSession {
                        user_id: user.id,
                        email: user.email,
                        token,
                    });
                    service.call(req).await
                }
                Err(app_err) => Err(app_err.into()),
            }
        })
    }
}
