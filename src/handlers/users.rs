use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::{
    config::Config,
    middleware::{CurrentUser, MaybeUser},
    models::{
        AvatarDto, AvatarResponseDto, CreateUserDto, CreatedUserDto, PageParams, Paginated,
        SetPasswordDto, SubscriptionDto, SubscriptionQueryParams, UserResponseDto,
    },
    services::{FollowServiceTrait, FollowServiceType, UserServiceTrait, UserServiceType},
    types::Result,
};

use super::url_builder;

/// Register route handler
pub async fn register_handler(
    dto: web::Json<CreateUserDto>,
    service: web::Data<UserServiceType>,
) -> Result<impl Responder> {
    let user = service.register(dto.into_inner()).await?;
    Ok(HttpResponse::Created().json(CreatedUserDto::from(user)))
}

/// Paginated user list
pub async fn list_users_handler(
    req: HttpRequest,
    query: web::Query<PageParams>,
    viewer: MaybeUser,
    service: web::Data<UserServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let urls = url_builder(&req, &config);
    let page = query.resolve(config.pagination.page_size)?;

    let (users, count) = service.list(viewer.id(), page).await?;
    let body = Paginated::new(users, count, page, &urls.current(&req))?
        .map(|row| UserResponseDto::from_row(row, &urls));
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_user_handler(
    req: HttpRequest,
    id: web::Path<i64>,
    viewer: MaybeUser,
    service: web::Data<UserServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let row = service.get(id.into_inner(), viewer.id()).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(UserResponseDto::from_row(row, &urls)))
}

pub async fn me_handler(
    req: HttpRequest,
    user: CurrentUser,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(UserResponseDto::new(user.0, false, &urls)))
}

pub async fn set_password_handler(
    user: CurrentUser,
    dto: web::Json<SetPasswordDto>,
    service: web::Data<UserServiceType>,
) -> Result<impl Responder> {
    service.set_password(user.0.id, dto.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn set_avatar_handler(
    req: HttpRequest,
    user: CurrentUser,
    dto: web::Json<AvatarDto>,
    service: web::Data<UserServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let path = service.set_avatar(user.0.id, dto.into_inner()).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(AvatarResponseDto {
        avatar: Some(urls.media(&path)),
    }))
}

pub async fn delete_avatar_handler(
    user: CurrentUser,
    service: web::Data<UserServiceType>,
) -> Result<impl Responder> {
    service.delete_avatar(user.0.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Authors the caller follows, each with a preview of their recipes
pub async fn subscriptions_handler(
    req: HttpRequest,
    user: CurrentUser,
    query: web::Query<SubscriptionQueryParams>,
    service: web::Data<FollowServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let urls = url_builder(&req, &config);
    let params = PageParams {
        page: query.page,
        limit: query.limit,
    };
    let page = params.resolve(config.pagination.page_size)?;
    let recipes_limit = query.recipes_limit.or(Some(config.pagination.recipes_limit));

    let (subscriptions, count) = service.subscriptions(user.0.id, page, recipes_limit).await?;
    let body = Paginated::new(subscriptions, count, page, &urls.current(&req))?
        .map(|subscription| SubscriptionDto::new(subscription, &urls));
    Ok(HttpResponse::Ok().json(body))
}

pub async fn subscribe_handler(
    req: HttpRequest,
    author_id: web::Path<i64>,
    user: CurrentUser,
    query: web::Query<SubscriptionQueryParams>,
    service: web::Data<FollowServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let recipes_limit = query.recipes_limit.or(Some(config.pagination.recipes_limit));
    let subscription = service
        .subscribe(user.0.id, author_id.into_inner(), recipes_limit)
        .await?;

    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Created().json(SubscriptionDto::new(subscription, &urls)))
}

pub async fn unsubscribe_handler(
    author_id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<FollowServiceType>,
) -> Result<impl Responder> {
    service.unsubscribe(user.0.id, author_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
