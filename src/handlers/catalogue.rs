use actix_web::{web, HttpResponse, Responder};

use crate::{
    models::IngredientQueryParams,
    services::{IngredientServiceTrait, IngredientServiceType, TagServiceTrait, TagServiceType},
    types::Result,
};

pub async fn list_tags_handler(service: web::Data<TagServiceType>) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(service.list().await?))
}

pub async fn get_tag_handler(
    id: web::Path<i64>,
    service: web::Data<TagServiceType>,
) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(service.get(id.into_inner()).await?))
}

/// Ingredients, optionally filtered by `?name=`
pub async fn search_ingredients_handler(
    query: web::Query<IngredientQueryParams>,
    service: web::Data<IngredientServiceType>,
) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(service.search(query.into_inner()).await?))
}

pub async fn get_ingredient_handler(
    id: web::Path<i64>,
    service: web::Data<IngredientServiceType>,
) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(service.get(id.into_inner()).await?))
}
