pub mod follow;
pub mod ingredient;
pub mod recipe;
pub mod recipe_mark;
pub mod shopping_cart;
pub mod short_link;
pub mod tag;
pub mod user;

pub use follow::{FollowRepository, FollowRepositoryTrait};
pub use ingredient::{IngredientRepository, IngredientRepositoryTrait};
pub use recipe::{RecipeRepository, RecipeRepositoryTrait};
pub use recipe_mark::{MarkKind, RecipeMarkRepository, RecipeMarkRepositoryTrait};
pub use shopping_cart::{ShoppingCartRepository, ShoppingCartRepositoryTrait};
pub use short_link::{ShortLinkRepository, ShortLinkRepositoryTrait};
pub use tag::{TagRepository, TagRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
