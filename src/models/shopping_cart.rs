use serde::Serialize;
use sqlx::FromRow;

/// One ingredient line of one recipe in a user's cart
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CartIngredientRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Total amount of one (name, unit) pair across the whole cart
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
