use std::sync::Arc;

use actix_web::web;

mod follow;
mod ingredient;
mod recipe;
mod recipe_mark;
mod shopping_cart;
mod short_link;
mod tag;
mod user;

pub use follow::{FollowService, FollowServiceTrait};
pub use ingredient::{IngredientService, IngredientServiceTrait};
pub use recipe::{RecipeService, RecipeServiceTrait};
pub use recipe_mark::{RecipeMarkService, RecipeMarkServiceTrait};
pub use shopping_cart::{ShoppingCartService, ShoppingCartServiceTrait};
pub use short_link::{ShortLinkService, ShortLinkServiceTrait};
pub use tag::{TagService, TagServiceTrait};
pub use user::{UserService, UserServiceTrait};

use crate::{
    config::Config,
    db::Database,
    repositories::{
        FollowRepository, IngredientRepository, RecipeMarkRepository, RecipeRepository,
        ShoppingCartRepository, ShortLinkRepository, TagRepository, UserRepository,
    },
    utils::{id_generator::ShortCodeGenerator, images::ImageStore},
};

pub type UserServiceType = UserService<UserRepository>;
pub type FollowServiceType = FollowService<FollowRepository>;
pub type TagServiceType = TagService<TagRepository>;
pub type IngredientServiceType = IngredientService<IngredientRepository>;
pub type RecipeServiceType = RecipeService<RecipeRepository>;
pub type RecipeMarkServiceType = RecipeMarkService<RecipeMarkRepository>;
pub type ShoppingCartServiceType = ShoppingCartService<ShoppingCartRepository>;
pub type ShortLinkServiceType = ShortLinkService<ShortLinkRepository>;

/// Service Register
pub fn register(db: Database, config: &Config, cfg: &mut web::ServiceConfig) {
    let images = ImageStore::new(config.media.root.clone());
    let generator = ShortCodeGenerator::new(config.short_link.code_length);

    let user_service =
        UserService::new(Arc::new(UserRepository::new(db.clone())), images.clone());
    let follow_service = FollowService::new(Arc::new(FollowRepository::new(db.clone())));
    let tag_service = TagService::new(Arc::new(TagRepository::new(db.clone())));
    let ingredient_service =
        IngredientService::new(Arc::new(IngredientRepository::new(db.clone())));
    let recipe_service = RecipeService::new(
        Arc::new(RecipeRepository::new(db.clone())),
        images.clone(),
        generator.clone(),
    );
    let mark_service = RecipeMarkService::new(Arc::new(RecipeMarkRepository::new(db.clone())));
    let cart_service =
        ShoppingCartService::new(Arc::new(ShoppingCartRepository::new(db.clone())));
    let short_link_service =
        ShortLinkService::new(Arc::new(ShortLinkRepository::new(db)), generator);

    cfg.app_data(web::Data::new(user_service))
        .app_data(web::Data::new(follow_service))
        .app_data(web::Data::new(tag_service))
        .app_data(web::Data::new(ingredient_service))
        .app_data(web::Data::new(recipe_service))
        .app_data(web::Data::new(mark_service))
        .app_data(web::Data::new(cart_service))
        .app_data(web::Data::new(short_link_service))
        .app_data(web::Data::new(images));
}
