// src/repositories/ingredient.rs - Read-only ingredient catalogue
use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::Ingredient;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IngredientRepositoryTrait {
    /// Case-insensitive search; names starting with `name` come before names merely containing it
    ///
    /// ### Arguments
    /// * `name` - The search term, `None` lists every ingredient
    async fn search(&self, name: Option<String>) -> Result<Vec<Ingredient>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Ingredient>>;
}

pub struct IngredientRepository {
    pool: PgPool,
}

impl IngredientRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

/// Escapes LIKE wildcards in user input
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl IngredientRepositoryTrait for IngredientRepository {
    async fn search(&self, name: Option<String>) -> Result<Vec<Ingredient>> {
        let term = match name.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => escape_like(term),
            _ => {
                let all = sqlx::query_as::<_, Ingredient>(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, id",
                )
                .fetch_all(&self.pool)
                .await?;
                return Ok(all);
            }
        };

        let found = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY CASE WHEN name ILIKE $1 || '%' THEN 0 ELSE 1 END, name, id
            "#,
        )
        .bind(term)
        .fetch_all(&self.pool)
        .await?;

        Ok(found)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Ingredient>> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }
}
