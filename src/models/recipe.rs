use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::form_urlencoded;
use validator::Validate;

use crate::errors::ServiceError;
use crate::utils::urls::UrlBuilder;
use crate::validations::{validate_image, validate_ingredient_amounts, validate_tag_ids};

use super::pagination::PageParams;
use super::tag::Tag;
use super::user::{UserResponseDto, UserRow};

/// Recipe columns plus the viewer-relative flags
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct RecipeTagRow {
    pub recipe_id: i64,
    #[sqlx(flatten)]
    pub tag: Tag,
}

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct RecipeIngredientRow {
    pub recipe_id: i64,
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Compact form used by favorites, cart and subscriptions
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct RecipeShort {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// A recipe with everything its full representation needs
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDetails {
    pub recipe: RecipeRow,
    pub author: UserRow,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredientRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct IngredientAmountDto {
    pub id: i64,
    #[validate(range(min = 1, message = "Amount must be at least 1"))]
    pub amount: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeDto {
    #[validate(length(min = 1, max = 256, message = "Name must be between 1 and 256 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: String,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: i32,

    #[validate(custom(function = "validate_image"))]
    pub image: String,

    #[validate(
        length(min = 1, message = "A recipe needs at least one tag"),
        custom(function = "validate_tag_ids")
    )]
    pub tags: Vec<i64>,

    #[validate(
        length(min = 1, message = "A recipe needs at least one ingredient"),
        custom(function = "validate_ingredient_amounts"),
        nested
    )]
    pub ingredients: Vec<IngredientAmountDto>,
}

/// Partial update; tags and ingredients are always replaced wholesale
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRecipeDto {
    #[validate(length(min = 1, max = 256, message = "Name must be between 1 and 256 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,

    #[validate(range(min = 1, message = "Cooking time must be at least 1 minute"))]
    pub cooking_time: Option<i32>,

    #[validate(custom(function = "validate_image"))]
    pub image: Option<String>,

    #[validate(
        length(min = 1, message = "A recipe needs at least one tag"),
        custom(function = "validate_tag_ids")
    )]
    pub tags: Vec<i64>,

    #[validate(
        length(min = 1, message = "A recipe needs at least one ingredient"),
        custom(function = "validate_ingredient_amounts"),
        nested
    )]
    pub ingredients: Vec<IngredientAmountDto>,
}

/// Validated recipe ready for insertion; `image` is a stored media path
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmountDto>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmountDto>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Tag slugs, a recipe matches if it has any of them
    pub tags: Vec<String>,
    pub author: Option<i64>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub page: PageParams,
}

impl RecipeQuery {
    /// Parses a raw query string; `tags` may repeat, so serde_urlencoded won't do
    pub fn parse(query: &str) -> Result<Self, ServiceError> {
        let mut parsed = RecipeQuery::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "tags" if !value.is_empty() => parsed.filter.tags.push(value.into_owned()),
                "author" if !value.is_empty() => {
                    parsed.filter.author = Some(parse_number(&key, &value)?)
                }
                "is_favorited" => parsed.filter.is_favorited = parse_flag(&key, &value)?,
                "is_in_shopping_cart" => {
                    parsed.filter.is_in_shopping_cart = parse_flag(&key, &value)?
                }
                "page" => parsed.page.page = Some(parse_number(&key, &value)?),
                "limit" => parsed.page.limit = Some(parse_number(&key, &value)?),
                _ => {}
            }
        }

        Ok(parsed)
    }
}

fn parse_number(key: &str, value: &str) -> Result<i64, ServiceError> {
    value
        .parse()
        .map_err(|_| ServiceError::ValidationError(format!("{} must be an integer", key)))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ServiceError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(ServiceError::ValidationError(format!(
            "{} must be 0, 1, true or false",
            key
        ))),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeIngredientDto {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredientRow> for RecipeIngredientDto {
    fn from(row: RecipeIngredientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponseDto {
    pub id: i64,
    pub name: String,
    pub tags: Vec<Tag>,
    pub author: UserResponseDto,
    pub ingredients: Vec<RecipeIngredientDto>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponseDto {
    pub fn new(details: RecipeDetails, urls: &UrlBuilder) -> Self {
        let RecipeDetails {
            recipe,
            author,
            tags,
            ingredients,
        } = details;

        Self {
            id: recipe.id,
            name: recipe.name,
            tags,
            author: UserResponseDto::from_row(author, urls),
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            is_favorited: recipe.is_favorited,
            is_in_shopping_cart: recipe.is_in_shopping_cart,
            image: urls.media(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeShortDto {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortDto {
    pub fn new(recipe: RecipeShort, urls: &UrlBuilder) -> Self {
        Self {
            id: recipe.id,
            image: urls.media(&recipe.image),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pancakes() -> CreateRecipeDto {
        CreateRecipeDto {
            name: "Pancakes".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 15,
            image: "data:image/png;base64,AAAA".to_string(),
            tags: vec![1],
            ingredients: vec![
                IngredientAmountDto { id: 1, amount: 200 },
                IngredientAmountDto { id: 2, amount: 2 },
            ],
        }
    }

    #[test]
    fn test_create_recipe_dto_valid() {
        assert!(pancakes().validate().is_ok());
    }

    #[test]
    fn test_create_recipe_dto_rejects_missing_collections() {
        let mut dto = pancakes();
        dto.tags.clear();
        dto.ingredients.clear();
        let errors = dto.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tags"));
        assert!(fields.contains_key("ingredients"));
    }

    #[test]
    fn test_create_recipe_dto_rejects_bad_values() {
        let mut dto = pancakes();
        dto.cooking_time = 0;
        dto.tags = vec![1, 1];
        dto.ingredients[1].amount = 0;
        let errors = dto.validate().unwrap_err();
        let message = crate::errors::flatten_validation_errors(&errors);
        assert!(message.contains("cooking_time"));
        assert!(message.contains("tags"));
        assert!(message.contains("ingredients[1].amount"));
    }

    #[test]
    fn test_update_recipe_dto_allows_missing_scalars() {
        let dto: UpdateRecipeDto = serde_json::from_str(
            r#"{"tags": [1], "ingredients": [{"id": 3, "amount": 1}]}"#,
        )
        .unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.name.is_none());
        assert!(dto.image.is_none());
    }

    #[test]
    fn test_update_recipe_dto_requires_collections() {
        let parsed = serde_json::from_str::<UpdateRecipeDto>(r#"{"name": "Soup"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_recipe_query_parse() {
        let query =
            RecipeQuery::parse("tags=breakfast&tags=lunch&author=3&is_favorited=1&page=2&limit=10")
                .unwrap();
        assert_eq!(query.filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(query.filter.author, Some(3));
        assert!(query.filter.is_favorited);
        assert!(!query.filter.is_in_shopping_cart);
        assert_eq!(query.page.page, Some(2));
        assert_eq!(query.page.limit, Some(10));
    }

    #[test]
    fn test_recipe_query_parse_errors() {
        assert!(RecipeQuery::parse("author=bob").is_err());
        assert!(RecipeQuery::parse("is_in_shopping_cart=maybe").is_err());
        assert_eq!(RecipeQuery::parse("").unwrap(), RecipeQuery::default());
        assert_eq!(RecipeQuery::parse("unknown=1").unwrap(), RecipeQuery::default());
    }
}
