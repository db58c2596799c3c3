use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;

use crate::{
    errors::AppError,
    middleware::{auth::token_from_request, CurrentUser},
    models::{LoginDto, TokenResponseDto},
    services::{UserServiceTrait, UserServiceType},
    types::Result,
};

/// Login route handler
pub async fn login_handler(
    dto: web::Json<LoginDto>,
    service: web::Data<UserServiceType>,
) -> Result<impl Responder> {
    let auth_token = service.login(dto.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TokenResponseDto { auth_token }))
}

/// Logout route handler, drops the token the request was made with
pub async fn logout_handler(
    req: HttpRequest,
    user: CurrentUser,
    service: web::Data<UserServiceType>,
) -> Result<impl Responder> {
    let token = token_from_request(&req)?.ok_or_else(|| {
        AppError::Unauthorized("Authentication credentials were not provided.".to_string())
    })?;
    service.logout(&token).await?;
    info!("User {} logged out", user.0.id);
    Ok(HttpResponse::NoContent().finish())
}
