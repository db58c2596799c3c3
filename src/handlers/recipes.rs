use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web, HttpRequest, HttpResponse, Responder,
};
use log::debug;

use crate::{
    config::Config,
    middleware::{CurrentUser, MaybeUser},
    models::{
        CreateRecipeDto, Paginated, RecipeQuery, RecipeResponseDto, RecipeShortDto,
        ShoppingListItem, UpdateRecipeDto,
    },
    repositories::MarkKind,
    services::{
        RecipeMarkServiceTrait, RecipeMarkServiceType, RecipeServiceTrait, RecipeServiceType,
        ShoppingCartServiceTrait, ShoppingCartServiceType,
    },
    types::Result,
    utils::text::capitalize,
};

use super::url_builder;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// Recipe list with tag, author and flag filters
pub async fn list_recipes_handler(
    req: HttpRequest,
    viewer: MaybeUser,
    service: web::Data<RecipeServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let query = RecipeQuery::parse(req.query_string())?;
    let page = query.page.resolve(config.pagination.page_size)?;
    let urls = url_builder(&req, &config);

    let (recipes, count) = service.list(&query.filter, viewer.id(), page).await?;
    let body = Paginated::new(recipes, count, page, &urls.current(&req))?
        .map(|details| RecipeResponseDto::new(details, &urls));
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_recipe_handler(
    req: HttpRequest,
    id: web::Path<i64>,
    viewer: MaybeUser,
    service: web::Data<RecipeServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let details = service.get(id.into_inner(), viewer.id()).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(RecipeResponseDto::new(details, &urls)))
}

pub async fn create_recipe_handler(
    req: HttpRequest,
    user: CurrentUser,
    dto: web::Json<CreateRecipeDto>,
    service: web::Data<RecipeServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let details = service.create(&user.0, dto.into_inner()).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Created().json(RecipeResponseDto::new(details, &urls)))
}

pub async fn update_recipe_handler(
    req: HttpRequest,
    id: web::Path<i64>,
    user: CurrentUser,
    dto: web::Json<UpdateRecipeDto>,
    service: web::Data<RecipeServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    let details = service
        .update(&user.0, id.into_inner(), dto.into_inner())
        .await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Ok().json(RecipeResponseDto::new(details, &urls)))
}

pub async fn delete_recipe_handler(
    id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<RecipeServiceType>,
) -> Result<impl Responder> {
    service.delete(&user.0, id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn add_mark(
    kind: MarkKind,
    req: HttpRequest,
    recipe_id: i64,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let recipe = service.add(kind, user.0.id, recipe_id).await?;
    let urls = url_builder(&req, &config);
    Ok(HttpResponse::Created().json(RecipeShortDto::new(recipe, &urls)))
}

async fn remove_mark(
    kind: MarkKind,
    recipe_id: i64,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
) -> Result<HttpResponse> {
    service.remove(kind, user.0.id, recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_favorite_handler(
    req: HttpRequest,
    id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    add_mark(MarkKind::Favorite, req, id.into_inner(), user, service, config).await
}

pub async fn remove_favorite_handler(
    id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
) -> Result<impl Responder> {
    remove_mark(MarkKind::Favorite, id.into_inner(), user, service).await
}

pub async fn add_to_cart_handler(
    req: HttpRequest,
    id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
    config: web::Data<Config>,
) -> Result<impl Responder> {
    add_mark(MarkKind::ShoppingCart, req, id.into_inner(), user, service, config).await
}

pub async fn remove_from_cart_handler(
    id: web::Path<i64>,
    user: CurrentUser,
    service: web::Data<RecipeMarkServiceType>,
) -> Result<impl Responder> {
    remove_mark(MarkKind::ShoppingCart, id.into_inner(), user, service).await
}

/// One `"Name - total unit."` line per ingredient
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "{} - {} {}.\n",
                capitalize(&item.name),
                item.total_amount,
                item.measurement_unit
            )
        })
        .collect()
}

/// Shopping list as a plain text attachment
pub async fn download_shopping_cart_handler(
    user: CurrentUser,
    service: web::Data<ShoppingCartServiceType>,
) -> Result<impl Responder> {
    let items = service.aggregate(user.0.id).await?;
    debug!("Rendering {} shopping list lines for user {}", items.len(), user.0.id);

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(SHOPPING_LIST_FILENAME.to_string())],
        })
        .body(render_shopping_list(&items)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shopping_list() {
        let items = vec![
            ShoppingListItem {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                total_amount: 500,
            },
            ShoppingListItem {
                name: "EGGS".to_string(),
                measurement_unit: "pcs".to_string(),
                total_amount: 3,
            },
        ];
        assert_eq!(
            render_shopping_list(&items),
            "Flour - 500 g.\nEggs - 3 pcs.\n"
        );
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_shopping_list(&[]), "");
    }
}
