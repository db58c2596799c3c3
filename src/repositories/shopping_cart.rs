// src/repositories/shopping_cart.rs - Raw ingredient lines behind a user's cart
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::CartIngredientRow;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingCartRepositoryTrait {
    /// One row per (recipe in cart, ingredient of that recipe), not yet summed
    async fn cart_ingredients(&self, user_id: i64) -> Result<Vec<CartIngredientRow>>;
}

pub struct ShoppingCartRepository {
    pool: PgPool,
}

impl ShoppingCartRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl ShoppingCartRepositoryTrait for ShoppingCartRepository {
    async fn cart_ingredients(&self, user_id: i64) -> Result<Vec<CartIngredientRow>> {
        let rows = sqlx::query_as::<_, CartIngredientRow>(
            r#"
            SELECT i.name, i.measurement_unit, ri.amount
            FROM shopping_cart sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
