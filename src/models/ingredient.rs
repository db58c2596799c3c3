use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct IngredientQueryParams {
    /// Case-insensitive name search, prefix matches first
    pub name: Option<String>,
}
