// src/middleware/auth.rs - Token authentication extractors
use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use log::{debug, error};

use crate::errors::AppError;
use crate::models::User;
use crate::services::{UserServiceTrait, UserServiceType};

const TOKEN_SCHEME: &str = "Token";

/// Authenticated caller; extraction fails with 401 for anonymous requests
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Caller if a token was sent, `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

/// Reads `Authorization: Token <key>`. Other schemes are treated as anonymous.
pub fn token_from_request(req: &HttpRequest) -> Result<Option<String>, AppError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid token header.".to_string()))?;
    let mut parts = value.split_whitespace();

    match (parts.next(), parts.next(), parts.next()) {
        (None, _, _) => Ok(None),
        (Some(scheme), _, _) if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) => Ok(None),
        (Some(_), Some(key), None) => Ok(Some(key.to_string())),
        (Some(_), None, _) => Err(AppError::Unauthorized(
            "Invalid token header. No credentials provided.".to_string(),
        )),
        (Some(_), Some(_), Some(_)) => Err(AppError::Unauthorized(
            "Invalid token header. Token string should not contain spaces.".to_string(),
        )),
    }
}

async fn authenticate(req: HttpRequest) -> Result<Option<User>, AppError> {
    let Some(token) = token_from_request(&req)? else {
        return Ok(None);
    };

    let service = req
        .app_data::<web::Data<UserServiceType>>()
        .cloned()
        .ok_or_else(|| {
            error!("User service is not registered");
            AppError::Internal("Authentication is unavailable".to_string())
        })?;

    let user = service.authenticate(&token).await?;
    debug!("Authenticated user {}", user.id);
    Ok(Some(user))
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { authenticate(req).await.map(MaybeUser) })
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            authenticate(req).await?.map(CurrentUser).ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided.".to_string())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::TestRequest, ResponseError};

    use super::*;

    #[test]
    fn test_token_from_request() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Token abc123"))
            .to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), Some("abc123".to_string()));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "token  abc123 "))
            .to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), Some("abc123".to_string()));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(token_from_request(&req).unwrap(), None);
    }

    #[test]
    fn test_malformed_token_header() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Token"))
            .to_http_request();
        assert!(matches!(token_from_request(&req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Token a b"))
            .to_http_request();
        assert!(matches!(token_from_request(&req), Err(AppError::Unauthorized(_))));
    }

    #[actix_web::test]
    async fn test_anonymous_extraction() {
        let (req, mut payload) = TestRequest::default().to_http_parts();

        let maybe = MaybeUser::from_request(&req, &mut payload).await.unwrap();
        assert!(maybe.0.is_none());
        assert_eq!(maybe.id(), None);

        let err = CurrentUser::from_request(&req, &mut payload).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
