use actix_web::web;

use crate::handlers::{auth, catalogue, recipes, short_links, users};

// `/api/...` routes; fixed segments are registered before `{id}` patterns
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth/token")
                    .route("/login", web::post().to(auth::login_handler))
                    .route("/logout", web::post().to(auth::logout_handler)),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::register_handler))
                    .route("", web::get().to(users::list_users_handler))
                    .route("/me", web::get().to(users::me_handler))
                    .route("/me/avatar", web::put().to(users::set_avatar_handler))
                    .route("/me/avatar", web::delete().to(users::delete_avatar_handler))
                    .route("/set_password", web::post().to(users::set_password_handler))
                    .route("/subscriptions", web::get().to(users::subscriptions_handler))
                    .route("/{id}", web::get().to(users::get_user_handler))
                    .route("/{id}/subscribe", web::post().to(users::subscribe_handler))
                    .route("/{id}/subscribe", web::delete().to(users::unsubscribe_handler)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::get().to(catalogue::list_tags_handler))
                    .route("/{id}", web::get().to(catalogue::get_tag_handler)),
            )
            .service(
                web::scope("/ingredients")
                    .route("", web::get().to(catalogue::search_ingredients_handler))
                    .route("/{id}", web::get().to(catalogue::get_ingredient_handler)),
            )
            .service(
                web::scope("/recipes")
                    .route("", web::get().to(recipes::list_recipes_handler))
                    .route("", web::post().to(recipes::create_recipe_handler))
                    .route(
                        "/download_shopping_cart",
                        web::get().to(recipes::download_shopping_cart_handler),
                    )
                    .route("/{id}", web::get().to(recipes::get_recipe_handler))
                    .route("/{id}", web::patch().to(recipes::update_recipe_handler))
                    .route("/{id}", web::delete().to(recipes::delete_recipe_handler))
                    .route("/{id}/get-link", web::get().to(short_links::get_link_handler))
                    .route("/{id}/favorite", web::post().to(recipes::add_favorite_handler))
                    .route("/{id}/favorite", web::delete().to(recipes::remove_favorite_handler))
                    .route("/{id}/shopping_cart", web::post().to(recipes::add_to_cart_handler))
                    .route(
                        "/{id}/shopping_cart",
                        web::delete().to(recipes::remove_from_cart_handler),
                    ),
            ),
    );
}
