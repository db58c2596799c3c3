mod recipe;
mod user;

pub use recipe::{validate_image, validate_ingredient_amounts, validate_tag_ids};
pub use user::validate_username;
