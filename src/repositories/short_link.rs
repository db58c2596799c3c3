// src/repositories/short_link.rs - Short code storage
use async_trait::async_trait;
use log::{debug, error};
use sqlx::{Connection, PgConnection, PgPool};

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::ShortLink;
use crate::utils::id_generator::{claim_unique_code, Claim, CodeSink, ShortCodeGenerator};

type Result<T> = std::result::Result<T, RepositoryError>;

/// Unique constraint on `short_links.code`
pub const CODE_CONSTRAINT: &str = "short_links_code_key";

// An existing row for the recipe wins over the new code; the no-op update makes RETURNING yield it
const CLAIM_SQL: &str = r#"
    INSERT INTO short_links (recipe_id, code)
    VALUES ($1, $2)
    ON CONFLICT (recipe_id) DO UPDATE SET recipe_id = EXCLUDED.recipe_id
    RETURNING id, recipe_id, code, created_at
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortLinkRepositoryTrait {
    /// Finds the link owning `code`
    ///
    /// ### Returns
    /// * `Result<Option<ShortLink>>` - The link if the code is known, or `None`
    ///
    /// ### Errors
    /// * `RepositoryError::Database` - If a database error occurs
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Finds the link of a recipe, if it has one yet
    async fn find_by_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>>;

    /// Whether a recipe row with this id exists
    async fn recipe_exists(&self, recipe_id: i64) -> Result<bool>;

    /// Generates and stores a fresh code for the recipe.
    ///
    /// Each attempt is an atomic insert; a clash on the code column is retried
    /// with a new code. A recipe that already owns a code gets that row back.
    ///
    /// ### Errors
    /// * `RepositoryError::InvalidData` - If the recipe does not exist
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create_for_recipe(
        &self,
        recipe_id: i64,
        generator: &ShortCodeGenerator,
    ) -> Result<ShortLink>;
}

/// Insert-or-fail on one connection. Every attempt runs in its own
/// transaction, or savepoint when the connection is already inside one,
/// so a clash never poisons the caller's transaction.
pub struct RecipeCodeSink<'a> {
    conn: &'a mut PgConnection,
    recipe_id: i64,
}

impl<'a> RecipeCodeSink<'a> {
    pub fn new(conn: &'a mut PgConnection, recipe_id: i64) -> Self {
        Self { conn, recipe_id }
    }
}

#[async_trait]
impl<'a> CodeSink for RecipeCodeSink<'a> {
    type Output = ShortLink;

    async fn try_claim(&mut self, code: &str) -> Result<Claim<ShortLink>> {
        let mut attempt = self.conn.begin().await?;

        let inserted = sqlx::query_as::<_, ShortLink>(CLAIM_SQL)
            .bind(self.recipe_id)
            .bind(code)
            .fetch_one(&mut *attempt)
            .await;

        match inserted {
            Ok(link) => {
                attempt.commit().await?;
                Ok(Claim::Claimed(link))
            }
            Err(e) => {
                attempt.rollback().await?;
                let err = RepositoryError::from(e);
                if err.is_duplicate_of(CODE_CONSTRAINT) {
                    Ok(Claim::Taken)
                } else {
                    Err(err)
                }
            }
        }
    }
}

pub struct ShortLinkRepository {
    pool: PgPool,
}

impl ShortLinkRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl ShortLinkRepositoryTrait for ShortLinkRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLink>(
            "SELECT id, recipe_id, code, created_at FROM short_links WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_by_recipe(&self, recipe_id: i64) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLink>(
            "SELECT id, recipe_id, code, created_at FROM short_links WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn recipe_exists(&self, recipe_id: i64) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_for_recipe(
        &self,
        recipe_id: i64,
        generator: &ShortCodeGenerator,
    ) -> Result<ShortLink> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            error!("Failed to acquire database connection: {}", e);
            RepositoryError::Database(e)
        })?;

        let mut sink = RecipeCodeSink::new(&mut conn, recipe_id);
        let link = claim_unique_code(&mut sink, generator).await?;

        debug!("Recipe {} has short code '{}'", recipe_id, link.code);
        Ok(link)
    }
}
