use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The authenticated session resolved by `AuthMiddleware`.
///
/// Carries the owning user's identity plus the exact token string the client
/// presented, so logout can remove precisely that session and leave the
/// user's other sessions alive.
///
/// If the session is not found in the extensions (e.g., if `AuthMiddleware` did
/// not run on this route), this extractor returns an `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i32,
    pub email: String,
    pub token: String,
}

impl FromRequest for AuthSession {
    type Error = ActixError; // AppError will be converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthSession>().cloned() {
            Some(session) => ready(Ok(session)),
            None => {
                // Only reachable when a handler using this extractor is mounted
                // outside the authenticated scope; rejecting is the safe default.
                let err = AppError::Unauthorized(
                    "Session not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_auth_session_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthSession {
            user_id: 123,
            email: "test@example.com".to_string(),
            token: "some-token".to_string(),
        });

        let mut payload = Payload::None;
        let extracted = AuthSession::from_request(&req, &mut payload).await;
        assert!(extracted.is_ok());

        let session = extracted.unwrap();
        assert_eq!(session.user_id, 123);
        assert_eq!(session.email, "test@example.com");
        assert_eq!(session.token, "some-token");
    }

    #[actix_rt::test]
    async fn test_auth_session_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();
        // No session inserted into extensions

        let mut payload = Payload::None;
        let extracted_result = AuthSession::from_request(&req, &mut payload).await;
        assert!(extracted_result.is_err());

        let err = extracted_result.unwrap_err();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
