// src/repositories/recipe.rs - Recipes and their tag/ingredient associations
use async_trait::async_trait;
use log::{debug, error};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, Transaction};

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{
    IngredientAmountDto, NewRecipe, RecipeChanges, RecipeFilter, RecipeIngredientRow, RecipeRow,
    RecipeTagRow, UserRow,
};
use crate::utils::id_generator::{claim_unique_code, ShortCodeGenerator};

use super::short_link::RecipeCodeSink;

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepositoryTrait {
    /// Inserts a recipe with its tags, ingredient amounts and short link in one transaction
    ///
    /// ### Arguments
    /// * `author_id` - The owner of the new recipe
    /// * `recipe` - Validated recipe, `image` already stored
    /// * `generator` - Source of candidate short codes
    ///
    /// ### Returns
    /// * `Result<i64>` - The id of the new recipe
    ///
    /// ### Errors
    /// * `RepositoryError::InvalidData` - If a tag or ingredient id does not exist
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create(
        &self,
        author_id: i64,
        recipe: &NewRecipe,
        generator: &ShortCodeGenerator,
    ) -> Result<i64>;

    /// Applies the given scalar changes and replaces tags and ingredients
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If the recipe does not exist
    /// * `RepositoryError::InvalidData` - If a tag or ingredient id does not exist
    async fn update(&self, id: i64, changes: &RecipeChanges) -> Result<()>;

    /// Deletes a recipe, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Finds a recipe with flags relative to `viewer`
    async fn find_by_id(&self, id: i64, viewer: Option<i64>) -> Result<Option<RecipeRow>>;

    /// Lists recipes matching `filter`, newest first
    ///
    /// ### Arguments
    /// * `filter` - Tag slugs, author and the viewer-relative flags
    /// * `viewer` - The requesting user; flag filters are ignored without one
    /// * `limit` - Page size
    /// * `offset` - Rows to skip
    async fn find(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>>;

    /// Number of recipes [`RecipeRepositoryTrait::find`] would page through
    async fn count(&self, filter: &RecipeFilter, viewer: Option<i64>) -> Result<i64>;

    /// Tags of the given recipes, ordered by tag id
    async fn tags_for(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeTagRow>>;

    /// Ingredient amounts of the given recipes, ordered by ingredient name
    async fn ingredients_for(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredientRow>>;

    /// Users by id as seen by `viewer`
    async fn authors(&self, author_ids: &[i64], viewer: Option<i64>) -> Result<Vec<UserRow>>;
}

pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    pub fn new(db: Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }

    async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        self.pool.begin().await.map_err(|e| {
            error!("Failed to start database transaction: {}", e);
            RepositoryError::Database(e)
        })
    }
}

/// `table` is one of our own table names, never user input
async fn missing_ids(conn: &mut PgConnection, table: &str, ids: &[i64]) -> Result<Vec<i64>> {
    let sql = format!(
        "SELECT x.id FROM UNNEST($1::BIGINT[]) AS x(id) WHERE x.id NOT IN (SELECT id FROM {}) ORDER BY x.id",
        table
    );
    let missing = sqlx::query_scalar::<_, i64>(&sql)
        .bind(ids)
        .fetch_all(conn)
        .await?;
    Ok(missing)
}

async fn ensure_references(
    conn: &mut PgConnection,
    tags: &[i64],
    ingredients: &[IngredientAmountDto],
) -> Result<()> {
    let missing_tags = missing_ids(&mut *conn, "tags", tags).await?;
    if !missing_tags.is_empty() {
        return Err(RepositoryError::InvalidData(format!(
            "Unknown tag ids: {}",
            join_ids(&missing_tags)
        )));
    }

    let ingredient_ids: Vec<i64> = ingredients.iter().map(|i| i.id).collect();
    let missing_ingredients = missing_ids(&mut *conn, "ingredients", &ingredient_ids).await?;
    if !missing_ingredients.is_empty() {
        return Err(RepositoryError::InvalidData(format!(
            "Unknown ingredient ids: {}",
            join_ids(&missing_ingredients)
        )));
    }

    Ok(())
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

async fn insert_associations(
    conn: &mut PgConnection,
    recipe_id: i64,
    tags: &[i64],
    ingredients: &[IngredientAmountDto],
) -> Result<()> {
    sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) SELECT $1, UNNEST($2::BIGINT[])")
        .bind(recipe_id)
        .bind(tags)
        .execute(&mut *conn)
        .await?;

    let (ids, amounts): (Vec<i64>, Vec<i32>) = ingredients.iter().map(|i| (i.id, i.amount)).unzip();
    sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
        SELECT $1, x.ingredient_id, x.amount
        FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS x(ingredient_id, amount)
        "#,
    )
    .bind(recipe_id)
    .bind(ids)
    .bind(amounts)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// SELECT list plus FROM clause; binds the viewer once per flag
fn push_select(builder: &mut QueryBuilder<'_, Postgres>, viewer: Option<i64>) {
    builder.push(
        "SELECT r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.created_at, \
         EXISTS (SELECT 1 FROM favorites fv WHERE fv.recipe_id = r.id AND fv.user_id = ",
    );
    builder.push_bind(viewer);
    builder.push(
        ") AS is_favorited, \
         EXISTS (SELECT 1 FROM shopping_cart sc WHERE sc.recipe_id = r.id AND sc.user_id = ",
    );
    builder.push_bind(viewer);
    builder.push(") AS is_in_shopping_cart FROM recipes r");
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    filter: &'a RecipeFilter,
    viewer: Option<i64>,
) {
    builder.push(" WHERE 1=1");

    if let Some(author) = filter.author {
        builder.push(" AND r.author_id = ");
        builder.push_bind(author);
    }

    if !filter.tags.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug = ANY(",
        );
        builder.push_bind(&filter.tags);
        builder.push("))");
    }

    // Anonymous viewers have no favorites or cart, so the flags are ignored for them
    if let Some(viewer) = viewer {
        if filter.is_favorited {
            builder.push(
                " AND EXISTS (SELECT 1 FROM favorites fv WHERE fv.recipe_id = r.id AND fv.user_id = ",
            );
            builder.push_bind(viewer);
            builder.push(")");
        }
        if filter.is_in_shopping_cart {
            builder.push(
                " AND EXISTS (SELECT 1 FROM shopping_cart sc WHERE sc.recipe_id = r.id AND sc.user_id = ",
            );
            builder.push_bind(viewer);
            builder.push(")");
        }
    }
}

#[async_trait]
impl RecipeRepositoryTrait for RecipeRepository {
    async fn create(
        &self,
        author_id: i64,
        recipe: &NewRecipe,
        generator: &ShortCodeGenerator,
    ) -> Result<i64> {
        let mut tx = self.begin_transaction().await?;

        ensure_references(&mut *tx, &recipe.tags, &recipe.ingredients).await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO recipes (author_id, name, text, cooking_time, image)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(&recipe.name)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(&recipe.image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert recipe: {}", e);
            RepositoryError::from(e)
        })?;

        insert_associations(&mut *tx, id, &recipe.tags, &recipe.ingredients).await?;

        let mut sink = RecipeCodeSink::new(&mut *tx, id);
        let link = claim_unique_code(&mut sink, generator).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            RepositoryError::Database(e)
        })?;

        debug!("Created recipe {} with short code '{}'", id, link.code);
        Ok(id)
    }

    async fn update(&self, id: i64, changes: &RecipeChanges) -> Result<()> {
        let mut tx = self.begin_transaction().await?;

        ensure_references(&mut *tx, &changes.tags, &changes.ingredients).await?;

        let result = sqlx::query(
            r#"
            UPDATE recipes SET
                name = COALESCE($2, name),
                text = COALESCE($3, text),
                cooking_time = COALESCE($4, cooking_time),
                image = COALESCE($5, image)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.text)
        .bind(changes.cooking_time)
        .bind(&changes.image)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Recipe {} not found", id)));
        }

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_associations(&mut *tx, id, &changes.tags, &changes.ingredients).await?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            RepositoryError::Database(e)
        })?;

        debug!("Updated recipe {}", id);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: i64, viewer: Option<i64>) -> Result<Option<RecipeRow>> {
        let mut builder = QueryBuilder::new("");
        push_select(&mut builder, viewer);
        builder.push(" WHERE r.id = ");
        builder.push_bind(id);

        builder
            .build_query_as::<RecipeRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::Database)
    }

    async fn find(
        &self,
        filter: &RecipeFilter,
        viewer: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRow>> {
        let mut builder = QueryBuilder::new("");
        push_select(&mut builder, viewer);
        push_filters(&mut builder, filter, viewer);

        builder.push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let recipes = builder
            .build_query_as::<RecipeRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(recipes)
    }

    async fn count(&self, filter: &RecipeFilter, viewer: Option<i64>) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut builder, filter, viewer);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn tags_for(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeTagRow>> {
        let rows = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn ingredients_for(&self, recipe_ids: &[i64]) -> Result<Vec<RecipeIngredientRow>> {
        let rows = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY i.name, i.id
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn authors(&self, author_ids: &[i64], viewer: Option<i64>) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name, u.avatar, u.is_admin, u.created_at,
                   EXISTS (
                       SELECT 1 FROM follows f WHERE f.user_id = $2 AND f.following_id = u.id
                   ) AS is_subscribed
            FROM users u
            WHERE u.id = ANY($1)
            "#,
        )
        .bind(author_ids)
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_skip_flags_for_anonymous_viewers() {
        let filter = RecipeFilter {
            tags: vec!["breakfast".to_string()],
            author: Some(3),
            is_favorited: true,
            is_in_shopping_cart: true,
        };

        let mut anonymous = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut anonymous, &filter, None);
        let sql = anonymous.sql().to_string();
        assert!(sql.contains("r.author_id = $1"));
        assert!(sql.contains("t.slug = ANY($2)"));
        assert!(!sql.contains("favorites"));
        assert!(!sql.contains("shopping_cart"));

        let mut signed_in = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filters(&mut signed_in, &filter, Some(7));
        let sql = signed_in.sql().to_string();
        assert!(sql.contains("fv.user_id = $3"));
        assert!(sql.contains("sc.user_id = $4"));
    }

    #[test]
    fn test_select_binds_viewer_per_flag() {
        let mut builder = QueryBuilder::<Postgres>::new("");
        push_select(&mut builder, Some(1));
        let sql = builder.sql().to_string();
        assert!(sql.contains("fv.user_id = $1) AS is_favorited"));
        assert!(sql.contains("sc.user_id = $2) AS is_in_shopping_cart"));
    }

    #[test]
    fn test_join_ids() {
        assert_eq!(join_ids(&[4, 9]), "4, 9");
    }
}
