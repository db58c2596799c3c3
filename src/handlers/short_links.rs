use actix_web::{http::header::LOCATION, web, HttpRequest, HttpResponse, Responder};
use log::{debug, info};

use crate::{
    config::Config,
    models::ShortLinkResponseDto,
    services::{ShortLinkServiceTrait, ShortLinkServiceType},
    types::Result,
};

use super::url_builder;

/// Short link of a recipe, created on first request
pub async fn get_link_handler(
    req: HttpRequest,
    recipe_id: web::Path<i64>,
    service: web::Data<ShortLinkServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let link = service.get_or_create(recipe_id.into_inner()).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(ShortLinkResponseDto {
        short_link: urls.short_link(&link.code),
    }))
}

/// Redirect route handler
pub async fn redirect_handler(
    req: HttpRequest,
    code: web::Path<String>,
    service: web::Data<ShortLinkServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let code = code.into_inner();
    debug!("Redirect requested for code: {}", code);

    let recipe_id = service.resolve(&code).await?;
    let target =
        url_builder(&req, &config).recipe(&config.short_link.recipe_path_prefix, recipe_id);

    info!("Redirecting '{}' to {}", code, target);
    Ok(HttpResponse::Found()
        .insert_header((LOCATION, target))
        .finish())
}
