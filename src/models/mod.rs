mod ingredient;
mod pagination;
mod recipe;
mod shopping_cart;
mod short_link;
mod tag;
mod user;

pub use ingredient::{Ingredient, IngredientQueryParams};
pub use pagination::{PageParams, PageRequest, Paginated};
pub use recipe::{
    CreateRecipeDto, IngredientAmountDto, NewRecipe, RecipeChanges, RecipeDetails, RecipeFilter,
    RecipeIngredientDto, RecipeIngredientRow, RecipeQuery, RecipeResponseDto, RecipeRow,
    RecipeShort, RecipeShortDto, RecipeTagRow, UpdateRecipeDto,
};
pub use shopping_cart::{CartIngredientRow, ShoppingListItem};
pub use short_link::{ShortLink, ShortLinkResponseDto};
pub use tag::Tag;
pub use user::{
    AvatarDto, AvatarResponseDto, CreateUserDto, CreatedUserDto, LoginDto, NewUser,
    SetPasswordDto, Subscription, SubscriptionDto, SubscriptionQueryParams, TokenResponseDto, User,
    UserCredentials, UserResponseDto, UserRow,
};
