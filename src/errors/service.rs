use thiserror::Error;

use super::RepositoryError;

/// Error type for service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Input validation failed or a domain precondition does not hold
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Resource was not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or invalid credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unrecoverable internal error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped repository error
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => Self::NotFound(msg),
            RepositoryError::Duplicate(constraint) => Self::ValidationError(duplicate_message(&constraint)),
            RepositoryError::InvalidData(msg) => Self::ValidationError(msg),
            err @ RepositoryError::Database(_) => Self::Repository(err),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(super::flatten_validation_errors(&errors))
    }
}

fn duplicate_message(constraint: &str) -> String {
    match constraint {
        "users_email_key" => "A user with that email already exists".to_string(),
        "users_username_key" => "A user with that username already exists".to_string(),
        "follows_user_following_key" => "You are already subscribed to this user".to_string(),
        "favorites_user_recipe_key" => "Recipe is already in favorites".to_string(),
        "shopping_cart_user_recipe_key" => "Recipe is already in the shopping cart".to_string(),
        "recipe_ingredients_recipe_ingredient_key" => "Ingredients must not repeat".to_string(),
        "recipe_tags_recipe_tag_key" => "Tags must not repeat".to_string(),
        _ => "Resource already exists".to_string(),
    }
}
