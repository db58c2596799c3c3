// src/repositories/recipe_mark.rs - Favorites and shopping cart membership
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::RecipeShort;

type Result<T> = std::result::Result<T, RepositoryError>;

/// Per-user recipe lists that share the same (user, recipe) shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Favorite,
    ShoppingCart,
}

impl MarkKind {
    fn table(self) -> &'static str {
        match self {
            MarkKind::Favorite => "favorites",
            MarkKind::ShoppingCart => "shopping_cart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarkKind::Favorite => "favorites",
            MarkKind::ShoppingCart => "the shopping cart",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeMarkRepositoryTrait {
    /// Adds the recipe to the user's list, returns false if it was already there
    async fn add(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<bool>;

    /// Removes the recipe from the user's list, returns false if it was not there
    async fn remove(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<bool>;

    async fn find_recipe(&self, recipe_id: i64) -> Result<Option<RecipeShort>>;
}

pub struct RecipeMarkRepository {
    pool: PgPool,
}

impl RecipeMarkRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl RecipeMarkRepositoryTrait for RecipeMarkRepository {
    async fn add(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<bool> {
        let sql = format!(
            "INSERT INTO {} (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT (user_id, recipe_id) DO NOTHING",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, kind: MarkKind, user_id: i64, recipe_id: i64) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            kind.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_recipe(&self, recipe_id: i64) -> Result<Option<RecipeShort>> {
        sqlx::query_as::<_, RecipeShort>(
            "SELECT id, name, image, cooking_time FROM recipes WHERE id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }
}
