use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::urls::UrlBuilder;
use crate::validations::{validate_image, validate_username};

use super::recipe::{RecipeShort, RecipeShortDto};

/// A registered account
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Path relative to the media root
    pub avatar: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// User as seen by a particular viewer
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct UserRow {
    #[sqlx(flatten)]
    pub user: User,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

/// Insert payload, password already hashed
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserDto {
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[validate(
        length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    #[validate(length(min = 1, max = 150, message = "First name must be between 1 and 150 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Last name must be between 1 and 150 characters"))]
    pub last_name: String,

    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetPasswordDto {
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub new_password: String,
    pub current_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AvatarDto {
    #[validate(custom(function = "validate_image"))]
    pub avatar: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvatarResponseDto {
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginDto {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponseDto {
    pub auth_token: String,
}

/// Created user, echoed back without the password
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for CreatedUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserResponseDto {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub is_subscribed: bool,
}

impl UserResponseDto {
    pub fn new(user: User, is_subscribed: bool, urls: &UrlBuilder) -> Self {
        Self {
            id: user.id,
            avatar: user.avatar.as_deref().map(|path| urls.media(path)),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }

    pub fn from_row(row: UserRow, urls: &UrlBuilder) -> Self {
        Self::new(row.user, row.is_subscribed, urls)
    }
}

/// A followed author with a preview of their recipes
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub author: User,
    pub recipes: Vec<RecipeShort>,
    pub recipes_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionDto {
    #[serde(flatten)]
    pub user: UserResponseDto,
    pub recipes: Vec<RecipeShortDto>,
    pub recipes_count: i64,
}

impl SubscriptionDto {
    pub fn new(subscription: Subscription, urls: &UrlBuilder) -> Self {
        Self {
            user: UserResponseDto::new(subscription.author, true, urls),
            recipes: subscription
                .recipes
                .into_iter()
                .map(|recipe| RecipeShortDto::new(recipe, urls))
                .collect(),
            recipes_count: subscription.recipes_count,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionQueryParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}
